use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::import_outcome::ImportSummary;

/// Port for the keyring operations the importer needs.
///
/// Implementations live in `adapters::key_tools` (e.g. `GpgKeyTool`).
/// The core layer only depends on this trait.
pub trait KeyTool: Send + Sync {
    /// Whether a key matching `identifier` is in the store.
    ///
    /// A missing store or an absent key is `Ok(false)`, never an error.
    fn check_presence(&self, store: &Path, identifier: &str) -> Result<bool>;

    /// Convert downloaded key data into binary keyring form.
    ///
    /// Binary input is returned byte-for-byte unchanged.
    fn normalize_to_binary(&self, artifact: &[u8]) -> Result<Vec<u8>>;

    /// Export the single key `identifier` from `keyring` into `dest`.
    ///
    /// Fails with `KeyNotFoundInArtifact` when the keyring does not carry it.
    fn extract_key(&self, keyring: &Path, identifier: &str, dest: &Path) -> Result<()>;

    /// Import a single-key file into the store. Safe to repeat.
    fn import_key(&self, store: &Path, key_file: &Path) -> Result<ImportSummary>;
}
