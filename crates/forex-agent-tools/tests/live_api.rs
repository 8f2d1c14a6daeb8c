//! Integration tests against the real Alpha Vantage API.
//!
//! These tests are `#[ignore]` by default. They need `ALPHA_VANTAGE_API_KEY`
//! in the environment (or a `.env` file) and each one spends one request of
//! the free-tier daily quota.
//!
//! Run explicitly with:
//! ```bash
//! cargo test -p forex-agent-tools --test live_api -- --ignored
//! ```

use forex_agent_models::{is_success, AlphaVantageConfig};
use forex_agent_tools::{Credentials, CryptoQuoteTool, ForexQuoteTool, NewsSentimentTool, Tool};
use serde_json::json;

fn api_key() -> Option<String> {
    let key = Credentials::from_env().alpha_vantage;
    if key.is_none() {
        eprintln!("Skipping: ALPHA_VANTAGE_API_KEY not set");
    }
    key
}

/// A rate-limited answer is still a well-formed payload; accept it.
fn assert_quote_or_rate_limit(result: &serde_json::Value) {
    if !is_success(result) {
        assert_eq!(result["error"], "API rate limit exceeded", "payload: {result}");
        return;
    }
    assert!(result["current_price"].as_f64().unwrap() > 0.0);
    assert!(result["ask_price"].as_f64() >= result["bid_price"].as_f64());
    assert_eq!(result["data_source"], "Alpha Vantage");
}

#[tokio::test]
#[ignore]
async fn live_crypto_quote() {
    let Some(key) = api_key() else { return };
    let tool = CryptoQuoteTool::new(&AlphaVantageConfig::default(), Some(key));
    let result = tool.run(json!({"symbol": "BTC", "vs_currency": "USD"})).await;

    assert_quote_or_rate_limit(&result);
    if is_success(&result) {
        assert_eq!(result["symbol"], "BTC/USD");
        assert_eq!(result["market_status"], "open");
    }
}

#[tokio::test]
#[ignore]
async fn live_forex_quote() {
    let Some(key) = api_key() else { return };
    let tool = ForexQuoteTool::new(&AlphaVantageConfig::default(), Some(key));
    let result = tool
        .run(json!({"from_currency": "EUR", "to_currency": "USD"}))
        .await;

    assert_quote_or_rate_limit(&result);
}

#[tokio::test]
#[ignore]
async fn live_news_sentiment() {
    let Some(key) = api_key() else { return };
    let tool = NewsSentimentTool::new(&AlphaVantageConfig::default(), Some(key));
    let result = tool
        .run(json!({"tickers": "CRYPTO:BTC", "limit": 5}))
        .await;

    if !is_success(&result) {
        assert_eq!(result["error"], "API rate limit exceeded", "payload: {result}");
        return;
    }
    assert!(result["articles"].as_array().unwrap().len() <= 5);
    assert!(result["sentiment_summary"]["market_mood"].is_string());
}
