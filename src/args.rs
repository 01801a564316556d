use clap::Parser;

use crate::config::ServiceConfig;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON service configuration
    #[arg(short, long, default_value = ServiceConfig::PATH)]
    pub config: PathBuf,

    /// ONNX model to load (overrides the config file)
    #[arg(long)]
    pub model: Option<String>,

    /// Address to bind (default 0.0.0.0)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (default 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Exit at startup if the model cannot be loaded
    #[arg(long, default_value_t = false)]
    pub require_model: bool,
}
