use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(version, propagate_version = true)]
#[command(about = "Planar linkage kinematics service", long_about = None)]
pub(crate) struct BackendConfig {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    pub address: SocketAddr,
    /// Mechanism description (JSON) to load at start-up.
    #[arg(short, long)]
    pub mechanism: Option<PathBuf>,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl BackendConfig {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
