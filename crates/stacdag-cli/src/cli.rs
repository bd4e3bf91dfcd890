use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "stacdag",
    about = "Convert a STAC catalog into a content-addressed DAG",
    version
)]
pub struct Cli {
    /// Root directory of the STAC catalog
    pub stac_dir: PathBuf,

    /// Directory receiving one file per block
    #[arg(default_value = "out")]
    pub out_dir: PathBuf,

    /// TOML file with resolver settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subdirectories resolved concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Compute identifiers without writing blocks
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
