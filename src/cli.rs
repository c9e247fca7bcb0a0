use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "privacy-analyzer",
    version,
    about = "Per-seed aggregation and plotting for privacy experiment results"
)]
pub struct Cli {
    /// Directory containing experiment result documents.
    #[arg(default_value = "out")]
    pub input_dir: PathBuf,

    /// Directory the analysis artifacts are written under.
    #[arg(default_value = "analysis")]
    pub output_dir: PathBuf,
}
