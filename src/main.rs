//! # Council
//!
//! Routes questions to domain specialists, augments them with retrieved
//! passages and reviews the answers.
//!
//! Usage:
//!   council chat                      # Interactive session on stdin
//!   council serve --port 8080         # HTTP gateway
//!   council models                    # List installed models
//!   council --config ./council.toml --log-file council.log chat

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use council_agent::Council;
use council_core::config::CouncilConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "council",
    version,
    about = "Ask a council of specialists: routed, retrieval-augmented, reviewed answers"
)]
struct Cli {
    /// Config file (default: ~/.council/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Verbose logging (prompts and replies at debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive question loop; `q` quits
    Chat,
    /// Run the HTTP gateway
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List models installed on the model service
    Models,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.verbose {
        "council=debug,council_agent=debug,council_knowledge=debug,council_providers=debug,council_gateway=debug,tower_http=debug"
    } else {
        "council=info,council_agent=info,council_knowledge=info,council_providers=info,council_gateway=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match &cli.log_file {
        Some(path) => {
            let path = expand_path(path);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CouncilConfig> {
    let config = match &cli.config {
        Some(path) => CouncilConfig::load_from(&expand_path(path))?,
        None => CouncilConfig::load()?,
    };
    tracing::info!(
        "Loaded config: {} specialist(s), model service at {}",
        config.specialists.len(),
        config.model_service.endpoint
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = load_config(&cli)?;

    match cli.command {
        Command::Chat => run_chat(&config).await,
        Command::Serve { port } => run_serve(config, port).await,
        Command::Models => run_models(&config).await,
    }
}

async fn run_chat(config: &CouncilConfig) -> Result<()> {
    let council = Council::start(config).await?;
    let orchestrator = council.orchestrator.clone();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Council ready with {} specialist(s). Type q to quit.", orchestrator.specialist_count());
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "q" {
            break;
        }

        let answer = orchestrator.chat(question).await;
        println!("{answer}\n");
    }

    let stats = council.stats.snapshot();
    println!(
        "Questions: {}  Answers: {}  Time: {:.1}s  Tokens: {}",
        stats.question_count, stats.answer_count, stats.total_duration, stats.total_tokens
    );
    Ok(())
}

async fn run_serve(config: CouncilConfig, port: Option<u16>) -> Result<()> {
    let council = Council::start(&config).await?;

    let mut gateway = config.gateway.clone();
    if let Some(port) = port {
        gateway.port = port;
    }
    council_gateway::start(&gateway, council.into()).await
}

async fn run_models(config: &CouncilConfig) -> Result<()> {
    let service = council_providers::connect(&config.model_service).await?;
    for name in service.catalog.installed() {
        println!("{name}");
    }
    Ok(())
}
