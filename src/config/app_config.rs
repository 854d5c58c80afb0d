use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::errors::{KeyringSyncError, Result};
use crate::core::models::key_record::{DEFAULT_SENTINEL, KeyRecord};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "keyring-sync.toml";

/// Starting configuration written by `keyring-sync init`.
pub const SAMPLE_CONFIG: &str = r#"# keyring-sync configuration

[keyring]
# Keyring the package manager trusts (referenced by signed-by=).
path = "/usr/share/keyrings/agent-archive-keyring.gpg"
# Identifier that is re-imported on every run. Its URL must point at a
# single standalone key, never a multi-key keyring.
sentinel = "CURRENT"
# Parent directory for per-import scratch directories.
# scratch_dir = "/var/tmp"
# gpg = "/usr/bin/gpg"
# gpg_homedir = "/root/.gnupg"
# timeout_secs = 60

[[keys]]
id = "CURRENT"
url = "https://keys.example.com/CURRENT.public"

# [[keys]]
# id = "D75CEA17048B9ACBF186794B32637D44F14F620E"
# url = "https://keys.example.com/agent-keyring.gpg"
"#;

/// Top-level configuration read from `keyring-sync.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub keyring: KeyringSection,
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

/// The `[keyring]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyringSection {
    pub path: PathBuf,
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    pub scratch_dir: Option<PathBuf>,
    pub gpg: Option<PathBuf>,
    pub gpg_homedir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

/// One `[[keys]]` entry. Order in the file is processing order.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEntry {
    pub id: String,
    pub url: String,
}

impl AppConfig {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(KeyringSyncError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            KeyringSyncError::InvalidConfig { detail } => KeyringSyncError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| KeyringSyncError::InvalidConfig {
            detail: format!("failed to parse TOML: {e}"),
        })?;
        config.records()?;
        Ok(config)
    }

    /// Build the validated, ordered key records.
    pub fn records(&self) -> Result<Vec<KeyRecord>> {
        if self.keyring.path.as_os_str().is_empty() {
            return Err(invalid("keyring.path must not be empty"));
        }
        if self.keyring.sentinel.trim().is_empty() {
            return Err(invalid("keyring.sentinel must not be empty"));
        }
        if self.keys.is_empty() {
            return Err(invalid("no [[keys]] entries configured"));
        }

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(self.keys.len());

        for entry in &self.keys {
            validate_url(&entry.id, &entry.url)?;
            let record = KeyRecord::new(&entry.id, &entry.url, &self.keyring.sentinel)?;
            if !seen.insert(record.identifier.clone()) {
                return Err(invalid(&format!("key '{}' is listed twice", entry.id)));
            }
            records.push(record);
        }

        Ok(records)
    }
}

fn validate_url(id: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(invalid(&format!("key '{id}' has an empty url")));
    }

    if let Some((scheme, _)) = url.split_once("://") {
        let scheme = scheme.to_ascii_lowercase();
        if !matches!(scheme.as_str(), "http" | "https" | "file") {
            return Err(invalid(&format!(
                "key '{id}' uses unsupported scheme '{scheme}' (expected http, https or file)"
            )));
        }
    }

    Ok(())
}

fn invalid(detail: &str) -> KeyringSyncError {
    KeyringSyncError::InvalidConfig {
        detail: detail.to_string(),
    }
}
