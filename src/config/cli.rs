use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "progeny")]
#[command(about = "Get PROGENy scores for selected collection.")]
pub struct CliConfig {
    /// name of collection
    pub collection_name: String,

    /// if selected, create an output Markdown file
    #[arg(short = 'o')]
    pub output_file: bool,

    /// Path to a TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resolwe server URL
    #[arg(long)]
    pub url: Option<String>,

    /// OmniPath server URL
    #[arg(long)]
    pub omnipath_url: Option<String>,

    /// Number of top genes per pathway
    #[arg(long)]
    pub top: Option<usize>,

    /// Directory for the Markdown file
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
