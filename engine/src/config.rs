use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_MODEL_PATH: &str = "utils/models/resnet18_chestxrays.pth";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Chest X-ray pneumonia classifier served over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "xray-engine", version, about)]
pub struct Config {
    /// ResNet-18 checkpoint (.pth state_dict or .safetensors), relative to the working directory
    #[arg(long, env = "XRAY_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Address the HTTP server listens on
    #[arg(long, env = "XRAY_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "XRAY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}
