pub const SYSTEM_PROMPT: &str = r#"You are an expert technical analyst specializing in trading chart analysis.
Analyze the provided trading chart frames and extract detailed technical information.

Focus on identifying:
1. Trading pair (e.g., BTC/USD, EUR/USD)
2. Timeframe (1m, 5m, 15m, 1h, 4h, 1d, ...)
3. Technical indicators visible (RSI, MACD, moving averages, Bollinger Bands, ...)
4. Chart patterns (triangles, head and shoulders, flags, pennants, wedges, ...)
5. Support and resistance levels
6. Trend direction and strength
7. Key price levels and significant zones
8. Volume information if visible

Provide your analysis in a structured JSON format with confidence scores."#;

const RESPONSE_SHAPE: &str = r#"{
  "trading_pair": "string (e.g., BTC/USD)",
  "timeframe": "string (e.g., 1h)",
  "technical_indicators": ["visible indicators"],
  "chart_patterns": [
    {"pattern": "pattern name", "confidence": 0.0-1.0, "description": "brief description"}
  ],
  "support_levels": [price levels],
  "resistance_levels": [price levels],
  "trend_direction": "bullish/bearish/sideways",
  "trend_strength": "strong/moderate/weak",
  "current_price_estimate": number,
  "key_observations": ["important notes"],
  "confidence_score": 0.0-1.0,
  "frame_analysis": {
    "total_frames_analyzed": integer,
    "consistency_across_frames": "high/medium/low"
  }
}"#;

/// Instruction text sent ahead of the frames.
pub fn instruction(analysis_focus: &str, frame_count: usize) -> String {
    format!(
        "Analyze these {frame_count} trading chart frames with focus on: {analysis_focus}\n\n\
         Provide a technical analysis in the following JSON structure:\n\
         {RESPONSE_SHAPE}\n\n\
         Be precise and only include information you can clearly observe in the charts."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_mentions_focus_and_shape() {
        let text = instruction("levels", 4);
        assert!(text.contains("focus on: levels"));
        assert!(text.contains("4 trading chart frames"));
        assert!(text.contains("\"support_levels\""));
    }
}
