use serde_json::Value as Metadata;
use uuid::Uuid;

use crate::account_path::AccountPath;
use crate::error::DomainError;
use crate::version::Version;

/// Enumeration of posting directions. The numeric assignment is part of the
/// persisted wire contract (spec.md §3): `Debit = 1`, `Credit = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Invalid = 0,
    Debit = 1,
    Credit = 2,
}

impl Operation {
    pub fn from_wire(raw: i32) -> Self {
        match raw {
            1 => Operation::Debit,
            2 => Operation::Credit,
            _ => Operation::Invalid,
        }
    }

    pub fn to_wire(self) -> i32 {
        self as i32
    }
}

/// A single debit or credit posting. Entries are only ever constructed
/// through [`Entry::new`]; the `Transaction` constructor assembles and
/// validates groups of them.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: Uuid,
    pub account: AccountPath,
    pub operation: Operation,
    pub expected_version: Version,
    pub amount: u64,
    pub metadata: Metadata,
}

impl Entry {
    pub fn new(
        id: Uuid,
        operation: Operation,
        account_text: &str,
        expected_version: Version,
        amount: u64,
        metadata: Metadata,
    ) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::InvalidEntryId);
        }

        let account = AccountPath::parse(account_text)?;

        if operation == Operation::Invalid {
            return Err(DomainError::InvalidOperation);
        }

        if amount == 0 {
            return Err(DomainError::InvalidAmount);
        }

        if !matches!(metadata, Metadata::Object(_) | Metadata::Null) {
            return Err(DomainError::InvalidMetadata);
        }

        Ok(Entry {
            id,
            account,
            operation,
            expected_version,
            amount,
            metadata,
        })
    }

    /// Signed contribution to a balance: credits add, debits subtract
    /// (spec.md §4.3.3 "sum of (credits − debits)").
    pub fn signed_amount(&self) -> i64 {
        match self.operation {
            Operation::Credit => self.amount as i64,
            Operation::Debit => -(self.amount as i64),
            Operation::Invalid => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct1() -> &'static str {
        "liability.clients.available.111"
    }

    #[test]
    fn rejects_nil_id() {
        let err = Entry::new(
            Uuid::nil(),
            Operation::Debit,
            acct1(),
            Version::Next,
            1,
            Metadata::Null,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidEntryId);
    }

    #[test]
    fn rejects_invalid_account() {
        let err = Entry::new(
            Uuid::new_v4(),
            Operation::Debit,
            "bad",
            Version::Next,
            1,
            Metadata::Null,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDepth { .. }));
    }

    #[test]
    fn rejects_invalid_operation() {
        let err = Entry::new(
            Uuid::new_v4(),
            Operation::Invalid,
            acct1(),
            Version::Next,
            1,
            Metadata::Null,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidOperation);
    }

    #[test]
    fn rejects_zero_amount() {
        let err = Entry::new(
            Uuid::new_v4(),
            Operation::Debit,
            acct1(),
            Version::Next,
            0,
            Metadata::Null,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidAmount);
    }

    #[test]
    fn rejects_non_object_metadata() {
        let err = Entry::new(
            Uuid::new_v4(),
            Operation::Debit,
            acct1(),
            Version::Next,
            1,
            Metadata::from(42),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidMetadata);

        let err = Entry::new(
            Uuid::new_v4(),
            Operation::Debit,
            acct1(),
            Version::Next,
            1,
            Metadata::Array(vec![Metadata::from(1)]),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidMetadata);
    }

    #[test]
    fn accepts_object_metadata() {
        let entry = Entry::new(
            Uuid::new_v4(),
            Operation::Debit,
            acct1(),
            Version::Next,
            1,
            serde_json::json!({"note": "reversal"}),
        )
        .unwrap();
        assert!(entry.metadata.is_object());
    }

    #[test]
    fn accepts_valid_entry() {
        let entry = Entry::new(
            Uuid::new_v4(),
            Operation::Credit,
            acct1(),
            Version::Concrete(4),
            123,
            Metadata::Null,
        )
        .unwrap();
        assert_eq!(entry.signed_amount(), 123);
    }
}
