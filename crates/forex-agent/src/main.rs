use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use forex_agent::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "forex-agent", about = "Chart video to trading strategy with a three-agent crew")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full crew on a chart video
    Run {
        /// Chart recording to analyze
        #[arg(long)]
        video: String,
        /// Trading pair, e.g. EUR/USD or BTC/USD
        #[arg(long)]
        pair: String,
        /// Where to write the strategy document
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch a crypto quote
    Crypto {
        symbol: String,
        #[arg(long, default_value = "USD")]
        vs: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Fetch a forex quote
    Forex {
        from: String,
        to: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Fetch news with sentiment
    News {
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        topics: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// LATEST, EARLIEST or RELEVANCE
        #[arg(long, default_value = "LATEST")]
        sort: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Analyze a chart video with the vision model
    Video {
        path: String,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long, default_value = "comprehensive")]
        focus: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Size a position from entry, stop and balance
    Risk {
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        stop: f64,
        #[arg(long)]
        balance: f64,
        #[arg(long, default_value_t = 2.0)]
        risk_pct: f64,
        #[arg(long)]
        take_profit: Option<f64>,
        #[arg(long)]
        pretty: bool,
    },
    /// List registered tools
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keys may live in .env
    let dotenv = dotenvy::dotenv();

    // Initialize tracing (respects RUST_LOG env var)
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(e) = forex_agent::env_file_problem(dotenv) {
        warn!(error = %e, "Ignoring unreadable .env file");
    }

    let mut config = forex_agent::load_config(&cli.config)?;
    let toolbox = forex_agent::build_toolbox(&config);

    let (tool, input, pretty) = match cli.command {
        Command::Run { video, pair, output } => {
            if let Some(path) = &output {
                forex_agent::override_output(&mut config.crew, path);
            }
            let crew = forex_agent::build_crew(&config, &toolbox)?;
            let result = forex_agent::run_pipeline(&crew, &video, &pair).await?;

            println!("{}", result.final_output);
            if let Some(path) = &result.output_file {
                info!(path = %path, "Strategy written");
                eprintln!("Strategy saved to {path}");
            }
            return Ok(());
        }
        Command::Tools => {
            for definition in toolbox.definitions() {
                println!("{:<24} {}", definition.name, definition.description);
            }
            return Ok(());
        }
        Command::Crypto { symbol, vs, pretty } => (
            "crypto_api_connector",
            json!({"symbol": symbol, "vs_currency": vs}),
            pretty,
        ),
        Command::Forex { from, to, pretty } => (
            "forex_data_fetcher",
            json!({"from_currency": from, "to_currency": to}),
            pretty,
        ),
        Command::News {
            tickers,
            topics,
            limit,
            sort,
            pretty,
        } => (
            "news_sentiment_fetcher",
            json!({"tickers": tickers, "topics": topics, "limit": limit, "sort": sort}),
            pretty,
        ),
        Command::Video {
            path,
            max_frames,
            focus,
            pretty,
        } => (
            "video_analysis_tool",
            json!({"video_path": path, "max_frames": max_frames, "analysis_focus": focus}),
            pretty,
        ),
        Command::Risk {
            entry,
            stop,
            balance,
            risk_pct,
            take_profit,
            pretty,
        } => (
            "risk_calculator",
            json!({
                "entry_price": entry,
                "stop_loss": stop,
                "account_balance": balance,
                "risk_percentage": risk_pct,
                "take_profit": take_profit,
            }),
            pretty,
        ),
    };

    let payload: Value = toolbox.call(tool, input).await;
    let output = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    println!("{output}");

    if !forex_agent::models::is_success(&payload) {
        std::process::exit(1);
    }
    Ok(())
}
