use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "buildsheet")]
#[command(about = "Price refurbished computers from their hardware specs")]
pub struct CliConfig {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(long, env = "BUILDSHEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// CPU table CSV, overriding `store.path` from the configuration.
    #[arg(long, env = "BUILDSHEET_CPU_TABLE")]
    pub data: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Rank CPUs matching a free-text query
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Price a machine from a JSON spec sheet
    Calculate {
        /// JSON file with the specs, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// Benchmark score to use instead of looking the CPU up
        #[arg(long)]
        manual_score: Option<f64>,
    },
    /// Load the CPU table and report what was loaded
    Check,
}
