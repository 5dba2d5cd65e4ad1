use diesel::result::{DatabaseErrorKind, Error as DieselError};

use ledger_domain::DomainError;

/// Classifies a `create_transaction` insert failure by database error code,
/// mirroring `create_transaction.go`'s `pgerrcode.RaiseException` /
/// `pgerrcode.UniqueViolation` switch (spec.md §4.3.2, §7). `used_next`
/// tells the caller whether any entry in the rejected transaction used
/// `Version::Next`, which determines retryability of the resulting
/// `ConcurrentVersionConflict`.
pub fn classify_write_error(err: DieselError, used_next: bool) -> DomainError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::IdempotencyKeyViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, info) => {
            // `RAISE EXCEPTION` in the version-advance trigger surfaces as
            // an unclassified database error (default SQLSTATE P0001); any
            // other unknown error is not ours to reinterpret.
            if info.message().contains("invalid account version") {
                DomainError::ConcurrentVersionConflict { used_next }
            } else {
                DomainError::Internal(info.message().to_string())
            }
        }
        other => DomainError::Internal(other.to_string()),
    }
}

/// Classifies a read failure. `NotFound` (no rows) is the only read-path
/// error the storage contract distinguishes; everything else is `Internal`.
pub fn classify_read_error(err: DieselError, account: &str) -> DomainError {
    match err {
        DieselError::NotFound => DomainError::AccountNotFound(account.to_string()),
        other => DomainError::Internal(other.to_string()),
    }
}
