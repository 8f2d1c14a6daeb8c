pub mod chart;
pub mod config;
pub mod crew_output;
pub mod news;
pub mod outcome;
pub mod quote;
pub mod risk;

pub use chart::{ChartAnalysis, ChartPattern};
pub use config::{
    AgentConfig, AlphaVantageConfig, AppConfig, CrewConfig, LlmConfig, TaskConfig, ToolsConfig,
    VisionConfig,
};
pub use crew_output::{CrewOutput, TaskOutput, ToolCallRecord};
pub use news::{MarketMood, NewsArticle, NewsDigest, NewsQueryInfo, SentimentSummary};
pub use outcome::{is_success, success_value, ToolFailure};
pub use quote::{MarketQuote, MarketStatus, PairInfo, Spread};
pub use risk::{RiskAssessment, StrategyReview, TradeDirection};
