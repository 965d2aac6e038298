use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ea-compiler")]
#[command(version, about = "Compile an MQL5 Expert Advisor with the external compiler")]
pub struct CliArgs {
    /// MQL5 source file (.mq5); relative paths also resolve under EA_STORAGE_PATH
    pub source_file: PathBuf,

    /// Product identifier appended to the artifact name
    pub product_id: String,

    /// License key to embed before compiling
    pub license_key: Option<String>,

    /// TOML configuration file; its values override the environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs on stderr as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "license-key")]
#[command(version, about = "Generate a license key for a user and product")]
pub struct LicenseKeyArgs {
    pub user_id: String,
    pub product_id: String,
}
