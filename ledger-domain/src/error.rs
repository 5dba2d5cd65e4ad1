use thiserror::Error;

/// Domain-level failures. The RPC facade (`ledger-api`) maps each variant to
/// a transport status code; no variant here carries a stack trace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("transaction id must not be nil")]
    InvalidTransactionId,

    #[error("entry id must not be nil")]
    InvalidEntryId,

    #[error("invalid account path: {0}")]
    InvalidAccount(String),

    #[error("account path contains characters outside [a-z0-9_.*]")]
    InvalidAccountComponentCharacters,

    #[error("account path depth must be at least {min}, got {actual}")]
    InvalidDepth { min: usize, actual: usize },

    #[error("operation must be Debit or Credit")]
    InvalidOperation,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("version must be a positive concrete version or a sentinel")]
    InvalidVersion,

    #[error("metadata must be a JSON object or absent")]
    InvalidMetadata,

    /// Raised by the storage engine when a concurrent writer won the race on
    /// the same account's version counter. Distinct from `InvalidVersion`
    /// (a client-side construction failure) because it maps to a different
    /// status code and may be retryable when the loser used `Version::Next`.
    #[error("expected version does not match the account's current version")]
    ConcurrentVersionConflict { used_next: bool },

    #[error("transaction must have at least 2 entries, got {0}")]
    InvalidEntriesNumber(usize),

    #[error("sum of debits ({debits}) does not equal sum of credits ({credits})")]
    InvalidBalance { debits: i64, credits: i64 },

    #[error("competence date is in the future")]
    InvalidCompetenceDate,

    #[error("page cursor does not match the account kind of this request")]
    InvalidPageCursor,

    #[error("account query does not resolve to a queryable account type")]
    InvalidAccountType,

    #[error("entry id has already been used in a prior transaction")]
    IdempotencyKeyViolation,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Whether a caller may safely retry the operation that produced this
    /// error. Mirrors the Retryable column of the error taxonomy table.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::ConcurrentVersionConflict { used_next: true }
        )
    }
}
