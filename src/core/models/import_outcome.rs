/// Counters reported by the import step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub processed: u32,
    pub imported: u32,
    pub unchanged: u32,
}

impl ImportSummary {
    /// Only newly added keys count as a change.
    pub fn added_keys(&self) -> bool {
        self.imported > 0
    }
}

/// Result of `KeyImporter::ensure_imported` for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub changed: bool,
    /// Whether the source was fetched on this run.
    pub fetched: bool,
    /// SHA256 of the downloaded artifact, when it was fetched.
    pub artifact_sha256: Option<String>,
}

impl ImportOutcome {
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            fetched: false,
            artifact_sha256: None,
        }
    }
}
