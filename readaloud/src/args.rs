use std::path::PathBuf;

use clap::Parser;

/// Read-aloud practice server
#[derive(Debug, Parser)]
#[command(name = "readaloud", about = "Reading practice with speech synthesis and pronunciation scoring")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "readaloud.toml", env = "READALOUD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "READALOUD_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
