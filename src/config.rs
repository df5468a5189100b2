//! Configuration: TOML file under the XDG config dir, every field defaulted,
//! CLI flags override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Structured-logging threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The `EnvFilter` directive this level maps to.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// All recognized options. Every field has a default so a missing or partial
/// config file is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When false, cache reads miss and writes are suppressed.
    pub cache_enabled: bool,
    /// Overrides the default cache file location.
    pub cache_path: Option<PathBuf>,
    /// When false, the canonical form is the raw input lowercased and no
    /// alternates are generated.
    pub normalization_enabled: bool,
    /// Per-adapter deadline within one request.
    pub adapter_timeout_ms: u64,
    /// Gates the external Sanskrit canonical-lookup probe.
    pub canonical_probe_enabled: bool,
    /// The canonical-lookup CGI endpoint.
    pub canonical_probe_url: String,
    /// Bound on the probe's process-wide connection pool.
    pub probe_pool_size: usize,
    /// Gates the fact index's lookup-first mode.
    pub fact_index_enabled: bool,
    /// When true, adapters store their raw response payloads.
    pub store_raw_responses: bool,
    pub log_level: LogLevel,
    /// Root for all persistent state; defaults to the XDG data dir.
    pub data_dir: Option<PathBuf>,
    /// Local Diogenes service.
    pub diogenes_url: String,
    /// Heritage CGI endpoint.
    pub heritage_url: String,
    /// Whitaker's Words binary.
    pub whitakers_bin: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_path: None,
            normalization_enabled: true,
            adapter_timeout_ms: 5_000,
            canonical_probe_enabled: true,
            canonical_probe_url: "http://localhost:8085/cgi-bin/sktindex".into(),
            probe_pool_size: 16,
            fact_index_enabled: false,
            store_raw_responses: false,
            log_level: LogLevel::Info,
            data_dir: None,
            diogenes_url: "http://localhost:8888".into(),
            heritage_url: "http://localhost:8080/cgi-bin/sktreader".into(),
            whitakers_bin: PathBuf::from("/usr/local/bin/words"),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file, falling back to defaults when the file is
    /// absent. A malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn adapter_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.adapter_timeout_ms)
    }
}
