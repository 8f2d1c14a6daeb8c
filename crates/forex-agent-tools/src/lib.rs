pub mod alpha_vantage;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod forex;
pub mod news;
pub mod parser;
pub mod strategy;
pub mod tool;
pub mod video;

use std::sync::Arc;

use forex_agent_models::ToolsConfig;

pub use credentials::Credentials;
pub use crypto::CryptoQuoteTool;
pub use error::ToolError;
pub use forex::ForexQuoteTool;
pub use news::{NewsQuery, NewsSentimentTool};
pub use strategy::{RiskCalculatorTool, StrategyValidatorTool};
pub use tool::{Tool, ToolDefinition, Toolbox};
pub use video::VideoAnalysisTool;

/// Every tool this crate provides, configured and keyed.
pub fn default_toolbox(config: &ToolsConfig, credentials: &Credentials) -> Toolbox {
    let av = &config.alpha_vantage;
    Toolbox::new()
        .with(Arc::new(VideoAnalysisTool::new(
            &config.vision,
            credentials.openai.clone(),
        )))
        .with(Arc::new(CryptoQuoteTool::new(av, credentials.alpha_vantage.clone())))
        .with(Arc::new(ForexQuoteTool::new(av, credentials.alpha_vantage.clone())))
        .with(Arc::new(NewsSentimentTool::new(av, credentials.alpha_vantage.clone())))
        .with(Arc::new(RiskCalculatorTool))
        .with(Arc::new(StrategyValidatorTool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toolbox_registers_all_tools() {
        let toolbox = default_toolbox(&ToolsConfig::default(), &Credentials::default());
        assert_eq!(
            toolbox.names(),
            vec![
                "video_analysis_tool",
                "crypto_api_connector",
                "forex_data_fetcher",
                "news_sentiment_fetcher",
                "risk_calculator",
                "strategy_validator",
            ]
        );
    }
}
