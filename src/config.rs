use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub storage: Storage,
    pub limits: Limits,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Server {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0".to_string(), port: 3000 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Storage {
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self { upload_dir: PathBuf::from("uploads"), public_dir: PathBuf::from("public") }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Limits {
    pub max_body_mb: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_body_mb: 10 }
    }
}

impl Limits {
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from defaults. `PORT` wins over the file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut cfg = if path.exists() {
            let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                serde_json::from_str(&raw)?
            } else {
                toml::from_str(&raw)?
            }
        } else {
            Config::default()
        };
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.bind_addr.trim().is_empty() { anyhow::bail!("bind_addr must not be empty"); }
        if self.limits.max_body_mb == 0 { anyhow::bail!("max_body_mb must be > 0"); }
        if self.limits.max_body_mb.checked_mul(1024 * 1024).is_none() {
            anyhow::bail!("max_body_mb is too large: {}", self.limits.max_body_mb);
        }
        if self.storage.upload_dir.exists() && !self.storage.upload_dir.is_dir() {
            anyhow::bail!("upload_dir is not a directory: {}", self.storage.upload_dir.display());
        }
        Ok(())
    }
}

pub fn canonical_dir(dir: &Path) -> anyhow::Result<PathBuf> {
    let c = dunce::canonicalize(dir)?;
    Ok(c)
}
