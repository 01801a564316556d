use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::args::Args;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub intra_threads: usize,
    /// Independent sessions over the same weights, so clients do not queue
    /// behind a single one.
    pub sessions: usize,
    /// Refuse to start without a model instead of serving degraded.
    pub require: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/cnn_alphabet_sibi.onnx".to_string(),
            intra_threads: 1,
            sessions: 2,
            require: false,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub const PATH: &'static str = "service.json";

    /// Read the config file if it exists. Missing fields fall back to their
    /// defaults and an unparsable file is replaced by defaults. A missing file
    /// is created with the defaults so there is something to edit.
    ///
    /// Runs before the subscriber is installed, so the outcome is returned
    /// and logged later by [`ConfigNote::report`].
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigNote)> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            let note = match config.save(path) {
                Ok(()) => ConfigNote::Created(path.to_path_buf()),
                Err(e) => ConfigNote::Missing {
                    path: path.to_path_buf(),
                    error: format!("{:#}", e),
                },
            };
            return Ok((config, note));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str::<ServiceConfig>(&content) {
            Ok(c) => Ok((c, ConfigNote::Loaded(path.to_path_buf()))),
            Err(e) => Ok((
                Self::default(),
                ConfigNote::Invalid {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                },
            )),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Command-line values win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(model) = &args.model {
            self.model.path = model.clone();
        }
        if args.require_model {
            self.model.require = true;
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

/// How [`ServiceConfig::load`] arrived at its result.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNote {
    Loaded(PathBuf),
    /// No file existed; defaults were written to this path.
    Created(PathBuf),
    /// No file existed and the defaults could not be written either.
    Missing { path: PathBuf, error: String },
    Invalid { path: PathBuf, error: String },
}

impl ConfigNote {
    pub fn report(&self) {
        match self {
            ConfigNote::Loaded(path) => info!("Loaded configuration from {}", path.display()),
            ConfigNote::Created(path) => {
                info!("Configuration file not found. Created default at {}", path.display())
            }
            ConfigNote::Missing { path, error } => warn!(
                "Configuration file {} not found and defaults could not be written: {}",
                path.display(),
                error
            ),
            ConfigNote::Invalid { path, error } => {
                warn!("Error parsing config {}: {}. Using defaults.", path.display(), error)
            }
        }
    }
}
