use crate::core::errors::{KeyringSyncError, Result};

/// Sentinel identifier used when the configuration does not name one.
pub const DEFAULT_SENTINEL: &str = "CURRENT";

/// A key to ensure in the keyring, as read from configuration.
///
/// `identifier` is either a normalized key ID (upper-case hex, no `0x`)
/// or the sentinel string. Records are never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub identifier: String,
    pub source_url: String,
}

impl KeyRecord {
    /// Build a record, validating the identifier unless it is the sentinel.
    pub fn new(identifier: &str, source_url: &str, sentinel: &str) -> Result<Self> {
        let identifier = if identifier == sentinel {
            identifier.to_string()
        } else {
            validate_key_id(identifier)?
        };

        Ok(Self {
            identifier,
            source_url: source_url.to_string(),
        })
    }

    pub fn is_sentinel(&self, sentinel: &str) -> bool {
        self.identifier == sentinel
    }
}

/// Whether a fingerprint from gpg output refers to the normalized `key_id`.
///
/// Short and long key IDs are the low-order digits of the fingerprint,
/// so a suffix match covers all three accepted forms.
pub fn fingerprint_matches(fingerprint: &str, key_id: &str) -> bool {
    fingerprint.to_ascii_uppercase().ends_with(key_id)
}

/// Validates a key ID before it is passed to a subprocess.
///
/// Accepted formats:
/// - 8 hex characters (short key ID, discouraged due to collisions)
/// - 16 hex characters (long key ID)
/// - 40 hex characters (full fingerprint, recommended)
/// - Any of the above with "0x" prefix
///
/// Returns the normalized key ID (uppercase, no prefix).
pub fn validate_key_id(identifier: &str) -> Result<String> {
    if identifier.is_empty() {
        return Err(KeyringSyncError::InvalidKeyId {
            identifier: identifier.to_string(),
            reason: "key ID cannot be empty".to_string(),
        });
    }

    let normalized = identifier
        .strip_prefix("0x")
        .or_else(|| identifier.strip_prefix("0X"))
        .unwrap_or(identifier)
        .to_uppercase();

    if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeyringSyncError::InvalidKeyId {
            identifier: identifier.to_string(),
            reason: "key ID must contain only hexadecimal characters".to_string(),
        });
    }

    match normalized.len() {
        8 | 16 | 40 => Ok(normalized),
        len => Err(KeyringSyncError::InvalidKeyId {
            identifier: identifier.to_string(),
            reason: format!("key ID must be 8, 16, or 40 hex characters (got {len})"),
        }),
    }
}
