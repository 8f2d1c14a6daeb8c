use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use forex_agent_models::{
    AlphaVantageConfig, NewsArticle, NewsDigest, NewsQueryInfo, SentimentSummary,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::alpha_vantage::AlphaVantageClient;
use crate::error::ToolError;
use crate::tool::{into_payload, parse_input, Tool};

/// Largest page the provider serves.
pub const MAX_ARTICLES: u32 = 1000;
const SORT_ORDERS: [&str; 3] = ["LATEST", "EARLIEST", "RELEVANCE"];

/// A news & sentiment query.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewsQuery {
    /// Comma-separated tickers, e.g. `CRYPTO:BTC,FOREX:USD`.
    #[serde(default)]
    pub tickers: Option<String>,
    /// Comma-separated topics, e.g. `blockchain,financial_markets`.
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            tickers: None,
            topics: None,
            limit: default_limit(),
            sort: default_sort(),
        }
    }
}

fn default_limit() -> u32 {
    50
}

fn default_sort() -> String {
    "LATEST".to_string()
}

impl NewsQuery {
    fn params(&self) -> Result<Vec<(&'static str, String)>, ToolError> {
        let sort = self.sort.trim().to_uppercase();
        if !SORT_ORDERS.contains(&sort.as_str()) {
            return Err(ToolError::InvalidInput(format!(
                "sort must be one of {}, got {:?}",
                SORT_ORDERS.join(", "),
                self.sort
            )));
        }

        let mut params = vec![
            ("function", "NEWS_SENTIMENT".to_string()),
            ("limit", self.limit.min(MAX_ARTICLES).to_string()),
            ("sort", sort),
        ];
        if let Some(tickers) = non_empty(&self.tickers) {
            params.push(("tickers", tickers.to_string()));
        }
        if let Some(topics) = non_empty(&self.topics) {
            params.push(("topics", topics.to_string()));
        }
        Ok(params)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Market news with per-article and aggregate sentiment.
pub struct NewsSentimentTool {
    client: AlphaVantageClient,
}

impl NewsSentimentTool {
    pub fn new(config: &AlphaVantageConfig, api_key: Option<String>) -> Self {
        Self {
            client: AlphaVantageClient::new(
                &config.base_url,
                api_key,
                Duration::from_secs(config.news_timeout_seconds),
            ),
        }
    }

    pub async fn fetch(&self, query: &NewsQuery) -> Result<NewsDigest, ToolError> {
        let params = query.params()?;
        let body = self.client.query(&params).await?;
        let digest = build_digest(body, query)?;

        info!(
            tickers = ?query.tickers,
            topics = ?query.topics,
            articles = digest.articles.len(),
            mood = ?digest.sentiment_summary.market_mood,
            "Fetched news sentiment"
        );
        Ok(digest)
    }
}

/// Reshape a `NEWS_SENTIMENT` body into a digest, keeping at most `query.limit` articles.
pub fn build_digest(body: Value, query: &NewsQuery) -> Result<NewsDigest, ToolError> {
    let feed = match body.get("feed").and_then(Value::as_array) {
        Some(feed) => feed,
        None => return Err(ToolError::UnexpectedFormat(body)),
    };

    let articles: Vec<NewsArticle> = feed
        .iter()
        .take(query.limit as usize)
        .map(article_from_json)
        .collect();

    Ok(NewsDigest {
        query_info: NewsQueryInfo {
            tickers: query.tickers.clone(),
            topics: query.topics.clone(),
            sort: query.sort.clone(),
            limit: query.limit,
            articles_returned: articles.len(),
        },
        sentiment_summary: SentimentSummary::from_articles(&articles),
        articles,
        data_source: "Alpha Vantage News & Sentiment".to_string(),
        timestamp: Utc::now(),
    })
}

fn article_from_json(article: &Value) -> NewsArticle {
    let text = |key: &str| {
        article
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    NewsArticle {
        title: text("title"),
        url: text("url"),
        time_published: text("time_published"),
        authors: article
            .get("authors")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        summary: text("summary"),
        source: text("source"),
        category_within_source: text("category_within_source"),
        overall_sentiment_score: article
            .get("overall_sentiment_score")
            .map(lenient_f64)
            .unwrap_or(0.0),
        overall_sentiment_label: article
            .get("overall_sentiment_label")
            .and_then(Value::as_str)
            .unwrap_or("Neutral")
            .to_string(),
        ticker_sentiment: article
            .get("ticker_sentiment")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

/// Scores arrive as numbers or as numeric strings depending on the field.
fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[async_trait]
impl Tool for NewsSentimentTool {
    fn name(&self) -> &'static str {
        "news_sentiment_fetcher"
    }

    fn description(&self) -> &'static str {
        "Fetch real-time market news and sentiment for forex and crypto pairs using Alpha \
         Vantage. Filter by tickers like CRYPTO:BTC or FOREX:USD and by topics like \
         blockchain, financial_markets or economy_monetary. Returns articles with sentiment \
         scores and an aggregate market mood."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "tickers": {
                    "type": "string",
                    "description": "Comma-separated tickers (e.g., 'CRYPTO:BTC,FOREX:USD')"
                },
                "topics": {
                    "type": "string",
                    "description": "News topics: blockchain, earnings, ipo, financial_markets, economy_fiscal, economy_monetary, technology, etc."
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of articles to return (max 1000). Default: 50"
                },
                "sort": {
                    "type": "string",
                    "enum": SORT_ORDERS,
                    "description": "Sort order. Default: LATEST"
                }
            }
        })
    }

    async fn run(&self, input: Value) -> Value {
        let result = match parse_input::<NewsQuery>(input) {
            Ok(query) => self.fetch(&query).await,
            Err(e) => Err(e),
        };
        into_payload(self.name(), result)
    }
}
