/// Why a record does or does not need an import on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// The sentinel key is re-synced on every run.
    Sentinel,
    /// The key is not in the store (or the store does not exist yet).
    Missing,
    /// The key is already in the store.
    Present,
}

/// Derived per record on every run, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDecision {
    pub needs_import: bool,
    pub reason: DecisionReason,
}

impl ImportDecision {
    pub fn sentinel() -> Self {
        Self {
            needs_import: true,
            reason: DecisionReason::Sentinel,
        }
    }

    pub fn from_presence(present: bool) -> Self {
        if present {
            Self {
                needs_import: false,
                reason: DecisionReason::Present,
            }
        } else {
            Self {
                needs_import: true,
                reason: DecisionReason::Missing,
            }
        }
    }
}

impl std::fmt::Display for ImportDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            DecisionReason::Sentinel => write!(f, "always refreshed"),
            DecisionReason::Missing => write!(f, "needs import"),
            DecisionReason::Present => write!(f, "present"),
        }
    }
}
