//! Server configuration, loaded from TOML.
//!
//! A bare name resolves to `/etc/campus/<name>.toml`; anything that
//! looks like a path (contains `/` or `.`) is used directly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    pub storage: StorageConfig,

    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address for the HTTP server.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all persistent state.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

fn default_expire_secs() -> i64 {
    604800 // 7 days
}

impl ServerConfig {
    /// Resolve a config name or path to a concrete file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/campus/{}.toml", name_or_path))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }
}
