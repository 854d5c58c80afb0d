use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::core::errors::{KeyringSyncError, Result};
use crate::core::models::import_decision::ImportDecision;
use crate::core::models::import_outcome::ImportOutcome;
use crate::core::models::key_record::KeyRecord;
use crate::core::traits::fetcher::Fetcher;
use crate::core::traits::key_tool::KeyTool;

const DOWNLOAD_FILE: &str = "source.download";
const NORMALIZED_FILE: &str = "source.gpg";
const EXTRACTED_FILE: &str = "key.gpg";

/// Ensures keys are present in a keyring store, importing only when needed.
///
/// Records are processed one at a time. Each import attempt gets its own
/// scratch directory that is removed when the attempt ends, whatever the
/// outcome. No scratch directory is created when the key is already present.
pub struct KeyImporter<T: KeyTool, F: Fetcher> {
    pub tool: T,
    pub fetcher: F,
    /// Identifier that always refers to a standalone key and is re-imported
    /// on every run.
    pub sentinel: String,
    /// Parent directory for scratch workspaces (system temp dir if `None`).
    pub scratch_dir: Option<PathBuf>,
}

impl<T: KeyTool, F: Fetcher> KeyImporter<T, F> {
    /// Decide whether `record` needs an import into `store` on this run.
    ///
    /// Never touches the network.
    pub fn decide(&self, store: &Path, record: &KeyRecord) -> Result<ImportDecision> {
        if record.is_sentinel(&self.sentinel) {
            return Ok(ImportDecision::sentinel());
        }

        let present = self.tool.check_presence(store, &record.identifier)?;
        debug!(key = %record.identifier, present, "presence check");
        Ok(ImportDecision::from_presence(present))
    }

    /// Make sure the key described by `record` is in `store`.
    ///
    /// `changed` is true only when the import step reports a newly added key.
    pub fn ensure_imported(&self, store: &Path, record: &KeyRecord) -> Result<ImportOutcome> {
        let decision = self.decide(store, record)?;
        if !decision.needs_import {
            info!(key = %record.identifier, "key already present, skipping");
            return Ok(ImportOutcome::unchanged());
        }

        let workspace = self.create_workspace()?;
        debug!(path = %workspace.path().display(), "created scratch workspace");

        let result = self.import_in(workspace.path(), store, record);

        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            warn!(
                path = %workspace_path.display(),
                error = %e,
                "could not remove scratch workspace"
            );
        }

        result
    }

    fn create_workspace(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".keyring-sync-");

        let dir = match &self.scratch_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn import_in(
        &self,
        workspace: &Path,
        store: &Path,
        record: &KeyRecord,
    ) -> Result<ImportOutcome> {
        let url = &record.source_url;

        info!(key = %record.identifier, %url, "fetching key");
        let raw = self.fetcher.fetch(url)?;
        let digest = sha256_hex(&raw);
        debug!(bytes = raw.len(), sha256 = %digest, "downloaded artifact");
        std::fs::write(workspace.join(DOWNLOAD_FILE), &raw)?;

        let binary = self
            .tool
            .normalize_to_binary(&raw)
            .map_err(|e| with_source_url(e, url))?;
        let normalized_path = workspace.join(NORMALIZED_FILE);
        std::fs::write(&normalized_path, &binary)?;

        let key_path = workspace.join(EXTRACTED_FILE);
        if record.is_sentinel(&self.sentinel) {
            // The sentinel source is always a single standalone key.
            std::fs::copy(&normalized_path, &key_path)?;
        } else {
            self.tool
                .extract_key(&normalized_path, &record.identifier, &key_path)
                .map_err(|e| with_source_url(e, url))?;
        }

        let summary = self.tool.import_key(store, &key_path)?;
        info!(
            key = %record.identifier,
            processed = summary.processed,
            imported = summary.imported,
            unchanged = summary.unchanged,
            "import finished"
        );

        Ok(ImportOutcome {
            changed: summary.added_keys(),
            fetched: true,
            artifact_sha256: Some(digest),
        })
    }
}

/// Attach the source URL to artifact errors raised by the key tool.
fn with_source_url(err: KeyringSyncError, url: &str) -> KeyringSyncError {
    match err {
        KeyringSyncError::MalformedArtifact { reason, .. } => {
            KeyringSyncError::MalformedArtifact {
                url: url.to_string(),
                reason,
            }
        }
        KeyringSyncError::KeyNotFoundInArtifact { identifier, .. } => {
            KeyringSyncError::KeyNotFoundInArtifact {
                identifier,
                url: url.to_string(),
            }
        }
        other => other,
    }
}

/// Compute the SHA256 hex digest of the given bytes.
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
