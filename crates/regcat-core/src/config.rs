use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fanout::{FailurePolicy, FanoutOptions, DEFAULT_WINDOW_SIZE};

/// Transport timeouts (optional `[transport]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request, body included.
    pub request_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// Global configuration loaded from `~/.config/regcat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegcatConfig {
    /// Registry root URL used when `--registry` is not given.
    #[serde(default)]
    pub registry_url: Option<String>,
    /// Maximum detail requests in flight per window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Page size requested from paginated list endpoints (None = server default).
    #[serde(default)]
    pub page_size: Option<u32>,
    /// What to do with items whose detail fetch failed: "report" or "drop".
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Optional transport timeouts; if missing, built-in defaults are used.
    #[serde(default)]
    pub transport: Option<TransportConfig>,
}

impl Default for RegcatConfig {
    fn default() -> Self {
        Self {
            registry_url: None,
            window_size: DEFAULT_WINDOW_SIZE,
            page_size: None,
            failure_policy: FailurePolicy::default(),
            transport: None,
        }
    }
}

impl RegcatConfig {
    pub fn transport(&self) -> TransportConfig {
        self.transport.clone().unwrap_or_default()
    }

    pub fn fanout_options(&self) -> FanoutOptions {
        FanoutOptions {
            window_size: self.window_size.max(1),
            failure_policy: self.failure_policy,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("regcat")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RegcatConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<RegcatConfig> {
    if !path.exists() {
        let default_cfg = RegcatConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: RegcatConfig = toml::from_str(&data)?;
    Ok(cfg)
}
