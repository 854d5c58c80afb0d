use serde::{Deserialize, Serialize};

/// Final state of one record in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Changed,
    Unchanged,
    Failed,
}

/// Per-record line of the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub id: String,
    pub url: String,
    pub status: RecordStatus,
    pub fetched: bool,
    pub artifact_sha256: Option<String>,
    pub error: Option<String>,
}

/// Aggregated result of an `import` run, suitable for an orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub keyring: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub changed: bool,
    pub failed: usize,
    pub results: Vec<RecordResult>,
}

impl RunReport {
    pub fn new(keyring: String, results: Vec<RecordResult>) -> Self {
        let changed = results.iter().any(|r| r.status == RecordStatus::Changed);
        let failed = results
            .iter()
            .filter(|r| r.status == RecordStatus::Failed)
            .count();

        Self {
            keyring,
            generated_at: chrono::Utc::now(),
            changed,
            failed,
            results,
        }
    }
}
