use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Average score at or above which the mood is fully bullish (and its
/// negation fully bearish).
pub const STRONG_SENTIMENT_THRESHOLD: f64 = 0.15;

/// Aggregate market mood derived from the average article sentiment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketMood {
    Bullish,
    #[serde(rename = "Slightly Bullish")]
    SlightlyBullish,
    Neutral,
    #[serde(rename = "Slightly Bearish")]
    SlightlyBearish,
    Bearish,
}

impl MarketMood {
    pub fn from_average(avg: f64) -> Self {
        if avg >= STRONG_SENTIMENT_THRESHOLD {
            Self::Bullish
        } else if avg <= -STRONG_SENTIMENT_THRESHOLD {
            Self::Bearish
        } else if avg > 0.0 {
            Self::SlightlyBullish
        } else if avg < 0.0 {
            Self::SlightlyBearish
        } else {
            Self::Neutral
        }
    }
}

/// One article from the news feed, reshaped from the provider response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub time_published: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub source: String,
    pub category_within_source: String,
    pub overall_sentiment_score: f64,
    pub overall_sentiment_label: String,
    /// Per-ticker breakdown, passed through as the provider sent it.
    pub ticker_sentiment: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentSummary {
    pub average_sentiment_score: f64,
    pub sentiment_distribution: BTreeMap<String, u32>,
    pub market_mood: MarketMood,
}

impl SentimentSummary {
    pub fn from_articles(articles: &[NewsArticle]) -> Self {
        let average = if articles.is_empty() {
            0.0
        } else {
            articles
                .iter()
                .map(|a| a.overall_sentiment_score)
                .sum::<f64>()
                / articles.len() as f64
        };

        let mut distribution = BTreeMap::new();
        for article in articles {
            *distribution
                .entry(article.overall_sentiment_label.clone())
                .or_insert(0) += 1;
        }

        Self {
            average_sentiment_score: round_to(average, 4),
            sentiment_distribution: distribution,
            market_mood: MarketMood::from_average(average),
        }
    }
}

/// Echo of the query that produced a digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsQueryInfo {
    pub tickers: Option<String>,
    pub topics: Option<String>,
    pub sort: String,
    pub limit: u32,
    pub articles_returned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsDigest {
    pub query_info: NewsQueryInfo,
    pub sentiment_summary: SentimentSummary,
    pub articles: Vec<NewsArticle>,
    pub data_source: String,
    pub timestamp: DateTime<Utc>,
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(score: f64, label: &str) -> NewsArticle {
        NewsArticle {
            title: "Bitcoin rallies".to_string(),
            url: "https://example.com/a".to_string(),
            time_published: "20250602T120000".to_string(),
            authors: vec![],
            summary: String::new(),
            source: "Example".to_string(),
            category_within_source: "Markets".to_string(),
            overall_sentiment_score: score,
            overall_sentiment_label: label.to_string(),
            ticker_sentiment: vec![],
        }
    }

    #[test]
    fn mood_thresholds() {
        assert_eq!(MarketMood::from_average(0.15), MarketMood::Bullish);
        assert_eq!(MarketMood::from_average(0.1), MarketMood::SlightlyBullish);
        assert_eq!(MarketMood::from_average(0.0), MarketMood::Neutral);
        assert_eq!(MarketMood::from_average(-0.05), MarketMood::SlightlyBearish);
        assert_eq!(MarketMood::from_average(-0.15), MarketMood::Bearish);
        assert_eq!(MarketMood::from_average(-0.9), MarketMood::Bearish);
    }

    #[test]
    fn mood_serializes_with_spaces() {
        let json = serde_json::to_string(&MarketMood::SlightlyBearish).unwrap();
        assert_eq!(json, "\"Slightly Bearish\"");
    }

    #[test]
    fn summary_averages_and_counts_labels() {
        let articles = vec![
            article(0.35, "Bullish"),
            article(0.2, "Somewhat-Bullish"),
            article(-0.1, "Neutral"),
            article(0.25, "Somewhat-Bullish"),
        ];

        let summary = SentimentSummary::from_articles(&articles);
        assert_eq!(summary.average_sentiment_score, 0.175);
        assert_eq!(summary.market_mood, MarketMood::Bullish);
        assert_eq!(summary.sentiment_distribution["Somewhat-Bullish"], 2);
        assert_eq!(summary.sentiment_distribution["Neutral"], 1);
    }

    #[test]
    fn empty_feed_is_neutral() {
        let summary = SentimentSummary::from_articles(&[]);
        assert_eq!(summary.average_sentiment_score, 0.0);
        assert_eq!(summary.market_mood, MarketMood::Neutral);
        assert!(summary.sentiment_distribution.is_empty());
    }

    #[test]
    fn rounding_keeps_four_places() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-0.5, 4), -0.5);
    }
}
