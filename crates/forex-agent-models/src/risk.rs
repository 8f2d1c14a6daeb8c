use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// A stop below the entry protects a long; anything else is a short.
    pub fn from_levels(entry: Decimal, stop_loss: Decimal) -> Self {
        if stop_loss < entry {
            Self::Long
        } else {
            Self::Short
        }
    }
}

/// Position sizing for a single trade at a fixed account risk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub direction: TradeDirection,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub take_profit: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub account_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_percentage: Decimal,
    /// Amount of the account put at risk.
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_per_unit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub position_size: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub position_value: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub reward_risk_ratio: Option<Decimal>,
}

/// Result of checking a proposed strategy for internal consistency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyReview {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub reward_risk_ratio: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn direction_follows_stop_placement() {
        assert_eq!(
            TradeDirection::from_levels(dec!(1.10), dec!(1.09)),
            TradeDirection::Long
        );
        assert_eq!(
            TradeDirection::from_levels(dec!(1.10), dec!(1.11)),
            TradeDirection::Short
        );
    }

    #[test]
    fn review_without_ratio_serializes_null() {
        let review = StrategyReview {
            valid: false,
            issues: vec!["missing stop_loss".to_string()],
            warnings: vec![],
            reward_risk_ratio: None,
        };
        let value = serde_json::to_value(&review).unwrap();
        assert!(value["reward_risk_ratio"].is_null());
        assert_eq!(value["issues"][0], "missing stop_loss");
    }
}
