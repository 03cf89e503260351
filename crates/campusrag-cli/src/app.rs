//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campusrag")]
#[command(
    author,
    version,
    about = "Retrieval pipeline for admissions and policy questions over a local knowledge base"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "CAMPUSRAG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Retrieve context for a query
    Retrieve(RetrieveArgs),

    /// Classify a query and show the strategy it would use
    Route(QueryArgs),

    /// Run fast, balanced and smart retrieval and evaluate each
    Compare(QueryArgs),

    /// Import pre-chunked fragments from a JSONL file
    Import(ImportArgs),

    /// Show knowledge base status
    Status,

    /// Show or write configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct QueryArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct RetrieveArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// How the retrieval strategy is chosen
    #[arg(long, value_enum, default_value = "smart")]
    pub mode: ModeArg,

    /// Fragments to retrieve per query (custom mode)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Minimum relevance score to keep a fragment (custom mode)
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Disable query reformulation (custom mode)
    #[arg(long)]
    pub no_expansion: bool,

    /// Use semantic search only (custom mode)
    #[arg(long)]
    pub no_hybrid: bool,

    /// Disable LLM reranking (custom mode)
    #[arg(long)]
    pub no_rerank: bool,

    /// Disable MMR diversity selection (custom mode)
    #[arg(long)]
    pub no_diversity: bool,

    /// Target compression ratio in (0, 1] (custom mode)
    #[arg(long)]
    pub compression: Option<f64>,

    /// Add hypothetical-answer retrieval (custom mode)
    #[arg(long)]
    pub hyde: bool,

    /// Print per-stage accounting after the context
    #[arg(long)]
    pub report: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSONL file, one `{content, source, metadata?}` object per line
    pub file: PathBuf,

    /// Fail when a fragment cannot be embedded
    #[arg(long)]
    pub require_embeddings: bool,

    /// Store fragments without embedding them
    #[arg(long, conflicts_with = "require_embeddings")]
    pub skip_embeddings: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Fast,
    Smart,
    Custom,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
