use std::path::Path;

use crate::cli::output;
use crate::config::app_config::SAMPLE_CONFIG;
use crate::core::errors::{KeyringSyncError, Result};

/// Execute the `keyring-sync init` command.
///
/// Writes a commented sample configuration. An existing file is only
/// replaced with `--force`.
pub fn execute(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(KeyringSyncError::InvalidConfig {
            detail: format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ),
        });
    }

    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, SAMPLE_CONFIG)?;

    output::success(&format!("Wrote {}", config_path.display()));
    output::detail("Edit [keyring].path and the [[keys]] entries, then run 'keyring-sync import'.");
    Ok(())
}
