use serde::{Deserialize, Serialize};

/// Confidence reported when the model answered in prose with no JSON at all.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;
/// Confidence reported when the model's JSON could not be parsed.
pub const PARSE_FAILURE_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPattern {
    pub pattern: String,
    pub confidence: f64,
    pub description: String,
}

/// Structured chart analysis. Only used when the vision model's reply could
/// not be taken as-is; a successfully parsed reply is passed through untyped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartAnalysis {
    pub trading_pair: String,
    pub timeframe: String,
    pub technical_indicators: Vec<String>,
    pub chart_patterns: Vec<ChartPattern>,
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub trend_direction: String,
    pub trend_strength: String,
    pub key_observations: Vec<String>,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChartAnalysis {
    fn unknown(observations: Vec<String>, confidence_score: f64, raw: &str) -> Self {
        Self {
            trading_pair: "Unknown".to_string(),
            timeframe: "Unknown".to_string(),
            technical_indicators: vec![],
            chart_patterns: vec![],
            support_levels: vec![],
            resistance_levels: vec![],
            trend_direction: "unknown".to_string(),
            trend_strength: "unknown".to_string(),
            key_observations: observations,
            confidence_score,
            raw_analysis: Some(raw.to_string()),
            error: None,
        }
    }

    /// The model replied in free text without any JSON object.
    pub fn unstructured(text: &str) -> Self {
        Self::unknown(vec![text.to_string()], NEUTRAL_CONFIDENCE, text)
    }

    /// The model replied with something brace-delimited that was not valid JSON.
    pub fn unparsable(text: &str) -> Self {
        let mut analysis = Self::unknown(
            vec!["Analysis completed but JSON parsing failed".to_string()],
            PARSE_FAILURE_CONFIDENCE,
            text,
        );
        analysis.error = Some("JSON parsing failed".to_string());
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstructured_keeps_text_as_observation() {
        let analysis = ChartAnalysis::unstructured("Looks like an uptrend on EUR/USD");
        assert_eq!(analysis.trading_pair, "Unknown");
        assert_eq!(analysis.trend_direction, "unknown");
        assert_eq!(analysis.confidence_score, NEUTRAL_CONFIDENCE);
        assert_eq!(analysis.key_observations, vec!["Looks like an uptrend on EUR/USD"]);
        assert!(analysis.error.is_none());
    }

    #[test]
    fn unparsable_flags_error() {
        let analysis = ChartAnalysis::unparsable("{not json}");
        assert_eq!(analysis.confidence_score, PARSE_FAILURE_CONFIDENCE);
        assert_eq!(analysis.error.as_deref(), Some("JSON parsing failed"));
        assert_eq!(analysis.raw_analysis.as_deref(), Some("{not json}"));
    }

    #[test]
    fn absent_error_is_not_serialized() {
        let value = serde_json::to_value(ChartAnalysis::unstructured("text")).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["confidence_score"], 0.5);
    }
}
