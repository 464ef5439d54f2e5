//! Quill binary: interactive research pipeline, memory indexing, and
//! one-shot tool dispatch.
//!
//! Usage:
//!   quill                      # interactive research run
//!   quill --config quill.toml research
//!   quill index ./docs
//!   quill tool '{"tool":"web_search","args":{"q":"carbon tax"}}'
//!
//! # Environment Variables
//!
//! - `OLLAMA_URL` / `OLLAMA_MODEL` - generation backend overrides
//! - `TAVILY_API_KEY` - search API key (searches return no hits without it)

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quill_cli::{driver, QuillConfig, ResearchDriver};
use quill_llm::build_generator;
use quill_memory::MemoryService;
use quill_tools::{parse_candidate, PageFetcher, Scheduler, SearchClient, Toolbox};
use quill_workflow::{DraftingPipeline, Policy, INTAKE_PROMPT};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quill", version, about = "Policy-gated research drafting assistant")]
struct Cli {
    /// Path to a quill.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive research pipeline (the default)
    Research,
    /// Index a folder of .pdf/.txt/.md documents into recall memory
    Index { folder: Option<PathBuf> },
    /// Dispatch a single tool request given as a JSON object
    Tool { request: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = QuillConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Research) {
        Command::Research => run_research(&config).await,
        Command::Index { folder } => run_index(&config, folder).await,
        Command::Tool { request } => run_tool(&config, &request).await,
    }
}

async fn run_research(config: &QuillConfig) -> anyhow::Result<()> {
    // The policy document gates every generation call; refuse to start
    // without it.
    let policy = Policy::load(&config.workflow.policy_path)?;
    let generator = build_generator(&config.generator.clone().with_env_overrides())?;

    println!("== Quill Research Assistant ==");
    println!("{INTAKE_PROMPT}");
    println!("Paste your brief (end with a blank line):\n");

    let brief = driver::read_brief(std::io::stdin().lock())?;
    if brief.is_empty() {
        anyhow::bail!("No brief supplied; nothing to research.");
    }

    let search = SearchClient::new(config.search.resolve_api_key());
    if !search.is_configured() {
        warn!("No search API key configured; searches will return no hits");
    }

    let pipeline = DraftingPipeline::new(generator, policy)
        .with_temperature(config.generator.temperature);
    let mut research = ResearchDriver::new(pipeline, search);
    research.run(&brief).await?;

    println!("\nDone.");
    Ok(())
}

async fn run_index(config: &QuillConfig, folder: Option<PathBuf>) -> anyhow::Result<()> {
    let folder = folder.unwrap_or_else(|| config.memory.docs_folder.clone());

    let memory = MemoryService::new();
    memory.initialize()?;

    let indexed = memory.index_folder(&folder).await?;
    println!("Indexed {indexed} documents from {}", folder.display());
    Ok(())
}

async fn run_tool(config: &QuillConfig, request: &str) -> anyhow::Result<()> {
    let Some(value) = parse_candidate(request) else {
        anyhow::bail!("No tool request found in input (expected a single JSON object).");
    };

    let memory = Arc::new(MemoryService::new());

    // Loading the embedding model is a one-time cost; only pay it when the
    // request actually recalls memory.
    if value.get("tool").and_then(|t| t.as_str()) == Some("rag_recall") {
        memory.initialize()?;
        if config.memory.docs_folder.is_dir() {
            memory.index_folder(&config.memory.docs_folder).await?;
        } else {
            warn!(
                folder = %config.memory.docs_folder.display(),
                "Docs folder missing; recall will search an empty memory"
            );
        }
    }

    let toolbox = Toolbox::new(
        SearchClient::new(config.search.resolve_api_key()),
        PageFetcher::new(),
        Scheduler::new(),
        memory,
    );

    let result = toolbox.dispatch_value(&value).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
