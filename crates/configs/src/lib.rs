use std::path::{Path, PathBuf};

use anyhow::anyhow;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Default upload ceiling for a single multipart request (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8081 }

/// How new student ids are chosen.
///
/// `CountBased` hands out `len + 1`, so an add after a delete can land on an
/// id that is still in use and overwrite that record. `Monotonic` keeps a
/// counter that only ever grows and is persisted next to the document.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    #[serde(alias = "count")]
    CountBased,
    #[default]
    Monotonic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_photo_extension")]
    pub photo_extension: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub id_policy: IdPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            uploads_dir: default_uploads_dir(),
            static_dir: default_static_dir(),
            photo_extension: default_photo_extension(),
            max_upload_bytes: default_max_upload_bytes(),
            id_policy: IdPolicy::default(),
        }
    }
}

fn default_data_file() -> PathBuf { PathBuf::from("studentData.json") }
fn default_uploads_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_static_dir() -> PathBuf { PathBuf::from("static") }
fn default_photo_extension() -> String { "jpg".to_string() }
fn default_max_upload_bytes() -> usize { DEFAULT_MAX_UPLOAD_BYTES }

fn config_path() -> PathBuf {
    std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// `Ok(None)` only when `path` does not exist. Unreadable or malformed files are errors.
pub fn load_optional(path: &Path) -> Result<Option<AppConfig>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let cfg = load_from_str(&content).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file at `CONFIG_PATH` (default `config.toml`) if it exists,
    /// otherwise defaults overlaid with `SERVER_HOST`/`SERVER_PORT`.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    pub fn load_or_env_from(path: &Path) -> Result<Self> {
        let mut cfg = match load_optional(path)? {
            Some(cfg) => cfg,
            None => Self::from_env(),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        if self.uploads_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.uploads_dir must not be empty"));
        }
        if self.static_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.static_dir must not be empty"));
        }
        let ext = self.photo_extension.as_str();
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(anyhow!("storage.photo_extension must be a bare extension such as `jpg`"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("storage.max_upload_bytes must be positive"));
        }
        Ok(())
    }
}
