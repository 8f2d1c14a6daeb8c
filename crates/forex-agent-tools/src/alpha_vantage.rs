//! Thin client for the Alpha Vantage query endpoint.
//!
//! Every call is a single GET with a fixed timeout. Provider-level errors
//! arrive inside a 200 response (`Error Message`, `Note`, `Information`) and
//! are turned into [`ToolError`]s here so the tools only see usable bodies.

use std::str::FromStr;
use std::time::Duration;

use forex_agent_models::{MarketQuote, MarketStatus, PairInfo, Spread};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::credentials::ALPHA_VANTAGE_KEY_ENV;
use crate::error::ToolError;

pub const DATA_SOURCE: &str = "Alpha Vantage";
const EXCHANGE_RATE_KEY: &str = "Realtime Currency Exchange Rate";

pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Body of a `CURRENCY_EXCHANGE_RATE` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeRate {
    #[serde(rename = "1. From_Currency Code")]
    pub from_code: String,
    #[serde(rename = "2. From_Currency Name")]
    pub from_name: String,
    #[serde(rename = "3. To_Currency Code")]
    pub to_code: String,
    #[serde(rename = "4. To_Currency Name")]
    pub to_name: String,
    #[serde(rename = "5. Exchange Rate")]
    pub exchange_rate: String,
    #[serde(rename = "6. Last Refreshed")]
    pub last_refreshed: String,
    #[serde(rename = "7. Time Zone")]
    pub time_zone: String,
    #[serde(rename = "8. Bid Price")]
    pub bid_price: String,
    #[serde(rename = "9. Ask Price")]
    pub ask_price: String,
}

impl RealtimeRate {
    /// Build a quote, computing the spread at `spread_dp` decimal places.
    pub fn into_quote(
        self,
        symbol: String,
        spread_dp: u32,
        market_status: MarketStatus,
    ) -> Result<MarketQuote, ToolError> {
        let current_price = parse_decimal("5. Exchange Rate", &self.exchange_rate)?;
        let bid_price = parse_decimal("8. Bid Price", &self.bid_price)?;
        let ask_price = parse_decimal("9. Ask Price", &self.ask_price)?;
        let spread = Spread::compute(bid_price, ask_price, spread_dp).ok_or_else(|| {
            ToolError::Parse(format!(
                "spread of bid {bid_price} and ask {ask_price} is out of range"
            ))
        })?;

        Ok(MarketQuote {
            symbol,
            current_price,
            bid_price,
            ask_price,
            spread: spread.absolute,
            spread_percentage: spread.percentage,
            timestamp: self.last_refreshed,
            timezone: self.time_zone,
            market_status,
            data_source: DATA_SOURCE.to_string(),
            pair_info: PairInfo {
                from_currency: self.from_code,
                from_currency_name: self.from_name,
                to_currency: self.to_code,
                to_currency_name: self.to_name,
            },
        })
    }
}

impl AlphaVantageClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue one query. Fails before any I/O when no API key is configured.
    pub async fn query(&self, params: &[(&str, String)]) -> Result<Value, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential(ALPHA_VANTAGE_KEY_ENV))?;

        let mut all_params: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all_params.push(("apikey", api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params)
            .map_err(|e| ToolError::InvalidInput(format!("Failed to build URL: {e}")))?;

        debug!(
            url = %url.as_str().replace(api_key, "***"),
            "Alpha Vantage request"
        );

        let body: Value = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_api_error(&body)?;
        Ok(body)
    }

    /// `CURRENCY_EXCHANGE_RATE` for one pair.
    pub async fn exchange_rate(&self, from: &str, to: &str) -> Result<RealtimeRate, ToolError> {
        let params = [
            ("function", "CURRENCY_EXCHANGE_RATE".to_string()),
            ("from_currency", from.to_string()),
            ("to_currency", to.to_string()),
        ];
        let body = self.query(&params).await?;
        parse_exchange_rate(body)
    }
}

/// Map in-band provider errors. A `Note` is always the rate limiter; an
/// `Information` only when it talks about call frequency.
pub fn check_api_error(body: &Value) -> Result<(), ToolError> {
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(ToolError::Provider(msg.to_string()));
    }

    if body.get("Note").is_some() {
        return Err(ToolError::RateLimited);
    }

    if let Some(info) = body.get("Information").and_then(Value::as_str) {
        let lower = info.to_lowercase();
        if lower.contains("rate limit")
            || lower.contains("call frequency")
            || lower.contains("requests per day")
        {
            return Err(ToolError::RateLimited);
        }
    }

    Ok(())
}

pub fn parse_exchange_rate(mut body: Value) -> Result<RealtimeRate, ToolError> {
    let rate = body.get_mut(EXCHANGE_RATE_KEY).map(Value::take);
    match rate {
        Some(rate) => serde_json::from_value(rate)
            .map_err(|e| ToolError::Parse(format!("exchange rate: {e}"))),
        None => Err(ToolError::UnexpectedFormat(body)),
    }
}

/// Normalize a currency or asset code: trimmed, upper-cased, non-empty.
pub(crate) fn currency_code(field: &str, raw: &str) -> Result<String, ToolError> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Err(ToolError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(code)
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ToolError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| ToolError::Parse(format!("{field} = {raw:?}: {e}")))
}
