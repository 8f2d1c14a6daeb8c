//! Local strategy tools: position sizing and a consistency check for a
//! proposed trade. Neither touches the network.

use async_trait::async_trait;
use forex_agent_models::{RiskAssessment, StrategyReview, TradeDirection};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{into_payload, parse_input, Tool};

const POSITION_SIZE_DP: u32 = 8;
const MONEY_DP: u32 = 2;
const RATIO_DP: u32 = 2;

/// Reward/risk below this is flagged.
pub const MIN_REWARD_RISK: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
/// Confidence below this is flagged.
pub const MIN_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct RiskInput {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub account_balance: f64,
    #[serde(default = "default_risk_percentage")]
    pub risk_percentage: f64,
    #[serde(default)]
    pub take_profit: Option<f64>,
}

fn default_risk_percentage() -> f64 {
    2.0
}

fn decimal(field: &str, value: f64) -> Result<Decimal, ToolError> {
    Decimal::from_f64(value)
        .ok_or_else(|| ToolError::InvalidInput(format!("{field} is not a finite number")))
}

fn positive(field: &str, value: f64) -> Result<Decimal, ToolError> {
    let d = decimal(field, value)?;
    if d <= Decimal::ZERO {
        return Err(ToolError::InvalidInput(format!("{field} must be positive")));
    }
    Ok(d)
}

fn out_of_range(what: &str) -> ToolError {
    ToolError::InvalidInput(format!("{what} is out of range"))
}

fn distance(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, ToolError> {
    a.checked_sub(b)
        .map(|d| d.abs())
        .ok_or_else(|| out_of_range(what))
}

/// `Ok(None)` when entry and stop coincide.
fn reward_risk(
    entry: Decimal,
    stop: Decimal,
    take_profit: Decimal,
) -> Result<Option<Decimal>, ToolError> {
    let risk = distance(entry, stop, "stop_loss distance")?;
    if risk.is_zero() {
        return Ok(None);
    }
    let reward = distance(take_profit, entry, "take_profit distance")?;
    reward
        .checked_div(risk)
        .map(|ratio| Some(ratio.round_dp(RATIO_DP)))
        .ok_or_else(|| out_of_range("reward/risk ratio"))
}

/// Size a position so that hitting the stop loses `risk_percentage` of the account.
pub fn assess_risk(input: &RiskInput) -> Result<RiskAssessment, ToolError> {
    let entry = positive("entry_price", input.entry_price)?;
    let stop = positive("stop_loss", input.stop_loss)?;
    let balance = positive("account_balance", input.account_balance)?;
    let pct = decimal("risk_percentage", input.risk_percentage)?;
    if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(ToolError::InvalidInput(
            "risk_percentage must be in (0, 100]".to_string(),
        ));
    }
    let take_profit = match input.take_profit {
        Some(tp) => Some(positive("take_profit", tp)?),
        None => None,
    };

    let risk_per_unit = distance(entry, stop, "stop_loss distance")?;
    if risk_per_unit.is_zero() {
        return Err(ToolError::InvalidInput(
            "stop_loss must differ from entry_price".to_string(),
        ));
    }

    let risk_amount = balance
        .checked_mul(pct)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| out_of_range("risk_amount"))?
        .round_dp(MONEY_DP);
    let position_size = risk_amount
        .checked_div(risk_per_unit)
        .ok_or_else(|| out_of_range("position_size"))?
        .round_dp(POSITION_SIZE_DP);
    let position_value = position_size
        .checked_mul(entry)
        .ok_or_else(|| out_of_range("position_value"))?
        .round_dp(MONEY_DP);
    let reward_risk_ratio = match take_profit {
        Some(tp) => reward_risk(entry, stop, tp)?,
        None => None,
    };

    Ok(RiskAssessment {
        direction: TradeDirection::from_levels(entry, stop),
        entry_price: entry,
        stop_loss: stop,
        take_profit,
        account_balance: balance,
        risk_percentage: pct,
        risk_amount,
        risk_per_unit,
        position_size,
        position_value,
        reward_risk_ratio,
    })
}

/// Position sizing and reward/risk for a single trade.
pub struct RiskCalculatorTool;

#[async_trait]
impl Tool for RiskCalculatorTool {
    fn name(&self) -> &'static str {
        "risk_calculator"
    }

    fn description(&self) -> &'static str {
        "Calculate position sizing, risk-reward ratios, and risk management parameters \
         for trading strategies."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "entry_price": {"type": "number", "description": "Entry price for the trade"},
                "stop_loss": {"type": "number", "description": "Stop loss price"},
                "account_balance": {"type": "number", "description": "Account balance"},
                "risk_percentage": {
                    "type": "number",
                    "description": "Risk percentage per trade. Default: 2.0"
                },
                "take_profit": {"type": "number", "description": "Optional take profit price"}
            },
            "required": ["entry_price", "stop_loss", "account_balance"]
        })
    }

    async fn run(&self, input: Value) -> Value {
        let result = parse_input::<RiskInput>(input).and_then(|input| assess_risk(&input));
        if let Ok(assessment) = &result {
            debug!(
                direction = ?assessment.direction,
                position_size = %assessment.position_size,
                "Assessed risk"
            );
        }
        into_payload(self.name(), result)
    }
}

#[derive(Debug, Deserialize)]
struct ValidatorInput {
    strategy_data: String,
}

/// Read a price field leniently: JSON numbers or numeric strings.
fn price_field(
    strategy: &serde_json::Map<String, Value>,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<Decimal> {
    let parsed = match strategy.get(field) {
        None | Some(Value::Null) => {
            issues.push(format!("missing {field}"));
            return None;
        }
        Some(Value::Number(n)) => n.as_f64().and_then(Decimal::from_f64),
        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        Some(_) => None,
    };
    if parsed.is_none() {
        issues.push(format!("{field} is not a number"));
    }
    parsed
}

fn direction_field(
    strategy: &serde_json::Map<String, Value>,
    issues: &mut Vec<String>,
) -> Option<TradeDirection> {
    match strategy.get("direction").and_then(Value::as_str) {
        None => {
            issues.push("missing direction".to_string());
            None
        }
        Some(d) => match d.trim().to_lowercase().as_str() {
            "long" | "buy" => Some(TradeDirection::Long),
            "short" | "sell" => Some(TradeDirection::Short),
            other => {
                issues.push(format!("direction must be long or short, got {other:?}"));
                None
            }
        },
    }
}

/// Check a strategy given as a JSON object string.
pub fn review_strategy(strategy_data: &str) -> Result<StrategyReview, ToolError> {
    let value: Value = serde_json::from_str(strategy_data)
        .map_err(|e| ToolError::Parse(format!("strategy_data is not valid JSON: {e}")))?;
    let strategy = value
        .as_object()
        .ok_or_else(|| ToolError::Parse("strategy_data must be a JSON object".to_string()))?;

    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let direction = direction_field(strategy, &mut issues);
    let entry = price_field(strategy, "entry_price", &mut issues);
    let stop = price_field(strategy, "stop_loss", &mut issues);
    let take_profit = price_field(strategy, "take_profit", &mut issues);

    if let (Some(direction), Some(entry), Some(stop)) = (direction, entry, stop) {
        match direction {
            TradeDirection::Long if stop >= entry => {
                issues.push("stop_loss must be below entry_price for a long".to_string())
            }
            TradeDirection::Short if stop <= entry => {
                issues.push("stop_loss must be above entry_price for a short".to_string())
            }
            _ => {}
        }
        if let Some(tp) = take_profit {
            match direction {
                TradeDirection::Long if tp <= entry => {
                    issues.push("take_profit must be above entry_price for a long".to_string())
                }
                TradeDirection::Short if tp >= entry => {
                    issues.push("take_profit must be below entry_price for a short".to_string())
                }
                _ => {}
            }
        }
    }

    let ratio = match (entry, stop, take_profit) {
        (Some(entry), Some(stop), Some(tp)) => match reward_risk(entry, stop, tp) {
            Ok(ratio) => ratio,
            Err(e) => {
                issues.push(e.to_string());
                None
            }
        },
        _ => None,
    };
    if let Some(ratio) = ratio {
        if ratio < MIN_REWARD_RISK {
            warnings.push(format!(
                "reward/risk ratio {ratio} is below {MIN_REWARD_RISK}"
            ));
        }
    }

    match strategy.get("confidence") {
        None | Some(Value::Null) => {}
        Some(c) => match c.as_f64() {
            Some(c) if c < MIN_CONFIDENCE => {
                warnings.push(format!("confidence {c} is below {MIN_CONFIDENCE}"))
            }
            Some(_) => {}
            None => warnings.push("confidence is not a number".to_string()),
        },
    }

    Ok(StrategyReview {
        valid: issues.is_empty(),
        issues,
        warnings,
        reward_risk_ratio: ratio,
    })
}

/// Consistency check for a proposed trade.
pub struct StrategyValidatorTool;

#[async_trait]
impl Tool for StrategyValidatorTool {
    fn name(&self) -> &'static str {
        "strategy_validator"
    }

    fn description(&self) -> &'static str {
        "Validate trading strategies against risk parameters and technical analysis \
         principles. Checks stop loss and take profit placement against the direction \
         and flags weak reward/risk or low confidence."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "strategy_data": {
                    "type": "string",
                    "description": "JSON string with direction (long/short), entry_price, stop_loss, take_profit and optional confidence"
                }
            },
            "required": ["strategy_data"]
        })
    }

    async fn run(&self, input: Value) -> Value {
        let result = parse_input::<ValidatorInput>(input)
            .and_then(|input| review_strategy(&input.strategy_data));
        into_payload(self.name(), result)
    }
}
