use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places kept on a crypto spread.
pub const CRYPTO_SPREAD_DP: u32 = 8;
/// Decimal places kept on a forex spread.
pub const FOREX_SPREAD_DP: u32 = 6;
/// Decimal places kept on the spread expressed as a percentage of the bid.
pub const SPREAD_PERCENT_DP: u32 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    Closed,
}

/// Currency codes and display names as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairInfo {
    pub from_currency: String,
    pub from_currency_name: String,
    pub to_currency: String,
    pub to_currency_name: String,
}

/// A single exchange-rate snapshot for a currency or crypto pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketQuote {
    /// `FROM/TO`, e.g. `BTC/USD`.
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spread: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spread_percentage: Decimal,
    /// Provider "Last Refreshed" value, passed through verbatim.
    pub timestamp: String,
    pub timezone: String,
    pub market_status: MarketStatus,
    pub data_source: String,
    pub pair_info: PairInfo,
}

/// Bid/ask spread, absolute and relative to the bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    pub absolute: Decimal,
    pub percentage: Decimal,
}

impl Spread {
    /// `ask - bid` rounded to `precision` places, and `spread / bid * 100`
    /// rounded to [`SPREAD_PERCENT_DP`]. The percentage is zero for a
    /// non-positive bid. `None` when the arithmetic overflows.
    pub fn compute(bid: Decimal, ask: Decimal, precision: u32) -> Option<Self> {
        let raw = ask.checked_sub(bid)?;
        let percentage = if bid > Decimal::ZERO {
            raw.checked_div(bid)?
                .checked_mul(Decimal::ONE_HUNDRED)?
                .round_dp(SPREAD_PERCENT_DP)
        } else {
            Decimal::ZERO
        };

        Some(Self {
            absolute: raw.round_dp(precision),
            percentage,
        })
    }
}
