use thiserror::Error;

/// Failures surfaced by the steward core.
///
/// A failed delete precondition is deliberately NOT represented here: gate
/// denials are normal outcomes carried in `PreconditionResult`, never errors.
#[derive(Debug, Error)]
pub enum StewardError {
    #[error("cluster unreachable: {0}")]
    ClusterUnreachable(String),

    #[error("admin operation `{op}` failed: {reason}")]
    Admin { op: String, reason: String },

    #[error("topic {topic} still present after {attempts} existence checks")]
    DeletionTimedOut { topic: String, attempts: u32 },

    #[error("migration ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl StewardError {
    pub fn admin(op: impl Into<String>, reason: impl Into<String>) -> Self {
        StewardError::Admin {
            op: op.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StewardError>;
