use std::time::Duration;

use async_trait::async_trait;
use forex_agent_models::quote::CRYPTO_SPREAD_DP;
use forex_agent_models::{AlphaVantageConfig, MarketQuote, MarketStatus};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::alpha_vantage::{currency_code, AlphaVantageClient};
use crate::error::ToolError;
use crate::tool::{into_payload, parse_input, Tool};

#[derive(Debug, Deserialize)]
struct CryptoInput {
    symbol: String,
    #[serde(default = "default_vs_currency")]
    vs_currency: String,
}

fn default_vs_currency() -> String {
    "USD".to_string()
}

/// Real-time crypto exchange rate with bid/ask spread.
pub struct CryptoQuoteTool {
    client: AlphaVantageClient,
}

impl CryptoQuoteTool {
    pub fn new(config: &AlphaVantageConfig, api_key: Option<String>) -> Self {
        Self {
            client: AlphaVantageClient::new(
                &config.base_url,
                api_key,
                Duration::from_secs(config.quote_timeout_seconds),
            ),
        }
    }

    /// Fetch a quote. A symbol written as a pair (`ETH/EUR`) overrides `vs_currency`.
    pub async fn fetch(&self, symbol: &str, vs_currency: &str) -> Result<MarketQuote, ToolError> {
        let (symbol, vs_currency) = match symbol.split_once('/') {
            Some((base, quote)) => (base, quote),
            None => (symbol, vs_currency),
        };
        let from = currency_code("symbol", symbol)?;
        let to = currency_code("vs_currency", vs_currency)?;

        let rate = self.client.exchange_rate(&from, &to).await?;
        // Crypto trades around the clock.
        let quote = rate.into_quote(format!("{from}/{to}"), CRYPTO_SPREAD_DP, MarketStatus::Open)?;

        info!(symbol = %quote.symbol, price = %quote.current_price, "Fetched crypto quote");
        Ok(quote)
    }
}

#[async_trait]
impl Tool for CryptoQuoteTool {
    fn name(&self) -> &'static str {
        "crypto_api_connector"
    }

    fn description(&self) -> &'static str {
        "Fetch real-time cryptocurrency market data using Alpha Vantage. Provides the current \
         exchange rate, bid/ask prices and spread for major cryptocurrencies."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Crypto symbol (e.g., BTC, ETH, ADA)"
                },
                "vs_currency": {
                    "type": "string",
                    "description": "Quote currency (USD, EUR, etc.). Default: USD"
                }
            },
            "required": ["symbol"]
        })
    }

    async fn run(&self, input: Value) -> Value {
        let result = match parse_input::<CryptoInput>(input) {
            Ok(input) => self.fetch(&input.symbol, &input.vs_currency).await,
            Err(e) => Err(e),
        };
        into_payload(self.name(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forex_agent_models::is_success;

    #[test]
    fn vs_currency_defaults_to_usd() {
        let input: CryptoInput = serde_json::from_value(serde_json::json!({"symbol": "ETH"})).unwrap();
        assert_eq!(input.vs_currency, "USD");
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected() {
        let tool = CryptoQuoteTool::new(&AlphaVantageConfig::default(), Some("key".to_string()));
        let result = tool.run(serde_json::json!({"symbol": "  "})).await;
        assert!(!is_success(&result));
        assert_eq!(result["error"], "Invalid input: symbol must not be empty");
    }

    #[tokio::test]
    async fn missing_symbol_is_invalid_input() {
        let tool = CryptoQuoteTool::new(&AlphaVantageConfig::default(), None);
        let result = tool.run(serde_json::json!({"vs_currency": "USD"})).await;
        assert!(!is_success(&result));
        assert!(result["error"].as_str().unwrap().contains("symbol"));
    }
}
