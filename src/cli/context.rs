use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::fetchers::http_fetcher::HttpFetcher;
use crate::adapters::key_tools::gpg_key_tool::GpgKeyTool;
use crate::cli::GlobalArgs;
use crate::config::app_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::core::errors::Result;
use crate::core::models::key_record::KeyRecord;
use crate::core::services::key_importer::KeyImporter;

/// Resolve the configuration path from `--config` or the default name.
pub fn config_path(global: &GlobalArgs) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Everything a command needs for one run against one keyring store.
pub struct RunContext {
    pub config: AppConfig,
    pub records: Vec<KeyRecord>,
    store: PathBuf,
    gpg: PathBuf,
}

impl RunContext {
    /// Load the configuration and apply command-line overrides.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = AppConfig::load(&config_path(global))?;
        let records = config.records()?;

        let store = global
            .keyring
            .clone()
            .unwrap_or_else(|| config.keyring.path.clone());
        let gpg = global
            .gpg
            .clone()
            .or_else(|| config.keyring.gpg.clone())
            .unwrap_or_else(|| PathBuf::from("gpg"));

        Ok(Self {
            config,
            records,
            store,
            gpg,
        })
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn sentinel(&self) -> &str {
        &self.config.keyring.sentinel
    }

    pub fn key_tool(&self) -> GpgKeyTool {
        GpgKeyTool::with_path(self.gpg.clone())
            .with_homedir(self.config.keyring.gpg_homedir.clone())
    }

    pub fn importer(&self) -> KeyImporter<GpgKeyTool, HttpFetcher> {
        let fetcher = match self.config.keyring.timeout_secs {
            Some(secs) => HttpFetcher::with_timeout(Duration::from_secs(secs)),
            None => HttpFetcher::new(),
        };

        KeyImporter {
            tool: self.key_tool(),
            fetcher,
            sentinel: self.config.keyring.sentinel.clone(),
            scratch_dir: self.config.keyring.scratch_dir.clone(),
        }
    }
}
