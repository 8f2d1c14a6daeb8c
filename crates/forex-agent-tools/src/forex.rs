use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use forex_agent_models::quote::FOREX_SPREAD_DP;
use forex_agent_models::{AlphaVantageConfig, MarketQuote, MarketStatus, ToolFailure};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::alpha_vantage::{currency_code, AlphaVantageClient};
use crate::error::ToolError;
use crate::tool::{into_payload, parse_input, Tool};

/// Hour (UTC) on Friday at which the forex week closes.
const FRIDAY_CLOSE_HOUR: u32 = 22;

#[derive(Debug, Deserialize)]
struct ForexInput {
    from_currency: String,
    to_currency: String,
}

/// Forex trades 24/5: closed on weekends and from Friday 22:00 UTC.
pub fn market_status_at(now: DateTime<Utc>) -> MarketStatus {
    match now.weekday() {
        Weekday::Sat | Weekday::Sun => MarketStatus::Closed,
        Weekday::Fri if now.hour() >= FRIDAY_CLOSE_HOUR => MarketStatus::Closed,
        _ => MarketStatus::Open,
    }
}

/// Real-time forex exchange rate with bid/ask spread and session status.
pub struct ForexQuoteTool {
    client: AlphaVantageClient,
}

impl ForexQuoteTool {
    pub fn new(config: &AlphaVantageConfig, api_key: Option<String>) -> Self {
        Self {
            client: AlphaVantageClient::new(
                &config.base_url,
                api_key,
                Duration::from_secs(config.quote_timeout_seconds),
            ),
        }
    }

    pub async fn fetch(&self, from_currency: &str, to_currency: &str) -> Result<MarketQuote, ToolError> {
        let from = currency_code("from_currency", from_currency)?;
        let to = currency_code("to_currency", to_currency)?;

        let rate = self.client.exchange_rate(&from, &to).await?;
        let quote = rate.into_quote(
            format!("{from}/{to}"),
            FOREX_SPREAD_DP,
            market_status_at(Utc::now()),
        )?;

        info!(symbol = %quote.symbol, price = %quote.current_price, "Fetched forex quote");
        Ok(quote)
    }
}

#[async_trait]
impl Tool for ForexQuoteTool {
    fn name(&self) -> &'static str {
        "forex_data_fetcher"
    }

    fn description(&self) -> &'static str {
        "Fetch real-time forex market data using Alpha Vantage. Provides exchange rates, \
         bid/ask prices, spread and market session status for major currency pairs."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "from_currency": {
                    "type": "string",
                    "description": "Base currency (e.g., EUR, GBP, USD)"
                },
                "to_currency": {
                    "type": "string",
                    "description": "Quote currency (e.g., USD, EUR, JPY)"
                }
            },
            "required": ["from_currency", "to_currency"]
        })
    }

    async fn run(&self, input: Value) -> Value {
        let input = match parse_input::<ForexInput>(input) {
            Ok(input) => input,
            Err(e) => return into_payload::<MarketQuote>(self.name(), Err(e)),
        };

        match self.fetch(&input.from_currency, &input.to_currency).await {
            // The provider rejects unknown pairs with a bare "Invalid API call".
            Err(ToolError::Provider(msg)) => {
                warn!(tool = self.name(), error = %msg, "Provider rejected pair");
                ToolFailure::new(msg)
                    .with_message(format!(
                        "Invalid currency pair: {}/{}",
                        input.from_currency, input.to_currency
                    ))
                    .to_value()
            }
            result => into_payload(self.name(), result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn weekdays_are_open() {
        // 2025-06-02 is a Monday.
        assert_eq!(market_status_at(at(2025, 6, 2, 0)), MarketStatus::Open);
        assert_eq!(market_status_at(at(2025, 6, 4, 13)), MarketStatus::Open);
        assert_eq!(market_status_at(at(2025, 6, 6, 21)), MarketStatus::Open);
    }

    #[test]
    fn friday_late_and_weekend_are_closed() {
        assert_eq!(market_status_at(at(2025, 6, 6, 22)), MarketStatus::Closed);
        assert_eq!(market_status_at(at(2025, 6, 7, 12)), MarketStatus::Closed);
        assert_eq!(market_status_at(at(2025, 6, 8, 23)), MarketStatus::Closed);
    }

    #[tokio::test]
    async fn missing_to_currency_is_invalid_input() {
        let tool = ForexQuoteTool::new(&AlphaVantageConfig::default(), None);
        let result = tool.run(serde_json::json!({"from_currency": "EUR"})).await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("to_currency"));
    }
}
