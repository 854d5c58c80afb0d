use std::path::PathBuf;

/// All domain errors for keyring-sync.
///
/// A key that is simply missing from the local store is not an error;
/// that case is an `ImportDecision`. Every variant here aborts the record
/// being processed.
#[derive(Debug, thiserror::Error)]
pub enum KeyringSyncError {
    #[error(
        "Could not fetch {url}: {reason}\n\n  \
         Check that the URL is reachable from this host.\n  \
         The keyring was not modified."
    )]
    FetchFailed { url: String, reason: String },

    #[error(
        "Downloaded key data from {url} is malformed: {reason}\n\n  \
         Expected an OpenPGP keyring (binary) or an ASCII-armored key block.\n  \
         The keyring was not modified."
    )]
    MalformedArtifact { url: String, reason: String },

    #[error(
        "Key {identifier} is not contained in {url}\n\n  \
         The source was downloaded but does not carry the requested key.\n  \
         Check the key ID in the configuration against the published keyring."
    )]
    KeyNotFoundInArtifact { identifier: String, url: String },

    #[error("Key import failed: {reason}")]
    ImportFailed { reason: String },

    #[error(
        "Could not run {tool}: {reason}\n\n  \
         Install GnuPG or point --gpg at the binary."
    )]
    ToolUnavailable { tool: String, reason: String },

    #[error("Invalid key ID '{identifier}': {reason}")]
    InvalidKeyId { identifier: String, reason: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Configuration file not found: {path}\n\n  \
         Run 'keyring-sync init' to create one, or pass --config <path>."
    )]
    ConfigNotFound { path: PathBuf },

    #[error("{failed} of {total} key(s) failed to import")]
    RecordsFailed { failed: usize, total: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeyringSyncError>;
