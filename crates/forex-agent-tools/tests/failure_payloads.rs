//! Every tool reports problems as a `"success": false` payload.
//!
//! None of these tests need the network: unreachable targets point at a
//! closed local port.

use forex_agent_models::{is_success, AlphaVantageConfig, VisionConfig};
use forex_agent_tools::{
    CryptoQuoteTool, ForexQuoteTool, NewsSentimentTool, Tool, VideoAnalysisTool,
};
use serde_json::json;

fn unreachable_alpha_vantage() -> AlphaVantageConfig {
    AlphaVantageConfig {
        base_url: "http://127.0.0.1:1/query".to_string(),
        quote_timeout_seconds: 5,
        news_timeout_seconds: 5,
    }
}

#[tokio::test]
async fn crypto_network_error_is_structured() {
    let tool = CryptoQuoteTool::new(&unreachable_alpha_vantage(), Some("test-key".to_string()));
    let result = tool.run(json!({"symbol": "BTC"})).await;

    assert!(!is_success(&result));
    assert!(result["error"].as_str().unwrap().starts_with("Network error"));
    assert_eq!(result["message"], "Check your internet connection");
}

#[tokio::test]
async fn forex_network_error_is_structured() {
    let tool = ForexQuoteTool::new(&unreachable_alpha_vantage(), Some("test-key".to_string()));
    let result = tool
        .run(json!({"from_currency": "EUR", "to_currency": "USD"}))
        .await;

    assert!(!is_success(&result));
    assert!(result["error"].as_str().unwrap().starts_with("Network error"));
}

#[tokio::test]
async fn news_network_error_is_structured() {
    let tool = NewsSentimentTool::new(&unreachable_alpha_vantage(), Some("test-key".to_string()));
    let result = tool.run(json!({"tickers": "CRYPTO:BTC", "limit": 5})).await;

    assert!(!is_success(&result));
    assert!(result["error"].as_str().unwrap().starts_with("Network error"));
}

#[tokio::test]
async fn missing_alpha_vantage_key_short_circuits() {
    let config = unreachable_alpha_vantage();
    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(CryptoQuoteTool::new(&config, None)),
        Box::new(ForexQuoteTool::new(&config, None)),
        Box::new(NewsSentimentTool::new(&config, None)),
    ];
    let inputs = [
        json!({"symbol": "ETH"}),
        json!({"from_currency": "GBP", "to_currency": "JPY"}),
        json!({}),
    ];

    for (tool, input) in tools.iter().zip(inputs) {
        let result = tool.run(input).await;
        assert!(!is_success(&result), "{} should fail", tool.name());
        assert_eq!(
            result["error"], "ALPHA_VANTAGE_API_KEY not found in environment variables",
            "{}",
            tool.name()
        );
    }
}

#[tokio::test]
async fn video_missing_file_or_dependency_is_structured() {
    // Whichever check trips first on this machine, the answer is a failure
    // payload naming the video.
    let tool = VideoAnalysisTool::new(&VisionConfig::default(), Some("sk-test".to_string()));
    let result = tool
        .run(json!({"video_path": "/definitely/not/here/chart.mp4"}))
        .await;

    assert!(!is_success(&result));
    assert_eq!(result["video_path"], "/definitely/not/here/chart.mp4");
    let error = result["error"].as_str().unwrap();
    assert!(
        error == "Video file not found: /definitely/not/here/chart.mp4"
            || error.starts_with("Missing dependency"),
        "unexpected error: {error}"
    );
}

#[tokio::test]
async fn video_missing_openai_key_is_structured() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("chart.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let tool = VideoAnalysisTool::new(&VisionConfig::default(), None);
    let result = tool
        .run(json!({"video_path": video.to_string_lossy()}))
        .await;

    assert!(!is_success(&result));
    let error = result["error"].as_str().unwrap();
    assert!(
        error == "OPENAI_API_KEY not found in environment variables"
            || error.starts_with("Missing dependency"),
        "unexpected error: {error}"
    );
}
