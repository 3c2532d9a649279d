use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Default log filter: quiet enough that the menu output stays readable.
pub const DEFAULT_LOG_FILTER: &str = "stockbook=warn";

#[derive(Parser, Debug)]
#[command(name = "stockbook")]
#[command(version, about = "Interactive stock book with price-range queries")]
pub struct Cli {
    /// Read menu input from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Don't print the menu or field prompts
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Log filter directives, written to stderr (e.g. "stockbook=debug")
    #[arg(long, env = "STOCKBOOK_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log: String,
}

impl Cli {
    /// The configured log filter, falling back to the default when the
    /// directives don't parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}
