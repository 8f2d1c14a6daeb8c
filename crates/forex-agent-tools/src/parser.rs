use forex_agent_models::ChartAnalysis;
use serde_json::Value;

/// What could be recovered from a vision model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartReply {
    /// A JSON object, taken as-is.
    Structured(serde_json::Map<String, Value>),
    /// Fallback built from the raw text.
    Fallback(ChartAnalysis),
}

impl ChartReply {
    pub fn into_map(self) -> serde_json::Map<String, Value> {
        match self {
            Self::Structured(map) => map,
            Self::Fallback(analysis) => match serde_json::to_value(analysis) {
                Ok(Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            },
        }
    }
}

/// Slice from the first `{` to the last `}`, inclusive.
///
/// Handles prose before and after the object as well as markdown fences.
/// Returns `None` when the reply has no brace pair at all.
pub fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        // Braces present but out of order; hand back the bad span for parsing.
        return Some(&text[end..=start]);
    }
    Some(&text[start..=end])
}

/// Parse a chart analysis reply, falling back to a low-confidence summary.
pub fn parse_chart_reply(text: &str) -> ChartReply {
    let Some(candidate) = outer_braces(text) else {
        return ChartReply::Fallback(ChartAnalysis::unstructured(text));
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => ChartReply::Structured(map),
        _ => ChartReply::Fallback(ChartAnalysis::unparsable(text)),
    }
}
