use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::entry::{Entry, Operation};
use crate::error::DomainError;

/// Tolerance applied when rejecting a transaction whose `competence_date` is
/// in the future, to absorb small clock skew between callers and the
/// service (spec.md §4.2).
pub const COMPETENCE_DATE_CLOCK_SKEW: Duration = Duration::seconds(30);

/// Minimum number of entries a transaction must carry.
pub const MIN_ENTRIES: usize = 2;

/// An atomic, balanced group of entries.
///
/// Constructed only through [`Transaction::new`], which validates balance
/// closure and sorts `entries` into the canonical order the storage engine
/// relies on for deadlock-free per-account locking (spec.md §3, §4.2).
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub event_code: u32,
    pub company: String,
    pub competence_date: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

impl Transaction {
    pub fn new(
        id: Uuid,
        event_code: u32,
        company: impl Into<String>,
        competence_date: DateTime<Utc>,
        mut entries: Vec<Entry>,
    ) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::InvalidTransactionId);
        }

        if entries.len() < MIN_ENTRIES {
            return Err(DomainError::InvalidEntriesNumber(entries.len()));
        }

        if competence_date > Utc::now() + COMPETENCE_DATE_CLOCK_SKEW {
            return Err(DomainError::InvalidCompetenceDate);
        }

        let mut debits: i64 = 0;
        let mut credits: i64 = 0;
        for entry in &entries {
            match entry.operation {
                Operation::Debit => debits += entry.amount as i64,
                Operation::Credit => credits += entry.amount as i64,
                Operation::Invalid => return Err(DomainError::InvalidOperation),
            }
        }

        if debits != credits {
            return Err(DomainError::InvalidBalance { debits, credits });
        }

        sort_canonical(&mut entries);

        Ok(Transaction {
            id,
            event_code,
            company: company.into(),
            competence_date,
            entries,
        })
    }
}

/// Sorts entries by `(account ascending, expected_version ascending)`,
/// treating version sentinels as greater than any concrete version. This is
/// the contract the storage engine relies on: transactions touching
/// overlapping accounts always take row locks in the same order.
fn sort_canonical(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        a.account
            .value()
            .cmp(b.account.value())
            .then_with(|| a.expected_version.cmp(&b.expected_version))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;
    use serde_json::Value as Metadata;

    fn entry(account: &str, op: Operation, version: Version, amount: u64) -> Entry {
        Entry::new(Uuid::new_v4(), op, account, version, amount, Metadata::Null).unwrap()
    }

    #[test]
    fn rejects_nil_id() {
        let entries = vec![
            entry(
                "liability.clients.available.111",
                Operation::Debit,
                Version::Next,
                1,
            ),
            entry(
                "liability.clients.available.222",
                Operation::Credit,
                Version::Next,
                1,
            ),
        ];
        let err = Transaction::new(Uuid::nil(), 1, "abc", Utc::now(), entries).unwrap_err();
        assert_eq!(err, DomainError::InvalidTransactionId);
    }

    #[test]
    fn rejects_fewer_than_two_entries() {
        let entries = vec![entry(
            "liability.clients.available.111",
            Operation::Debit,
            Version::Next,
            1,
        )];
        let err =
            Transaction::new(Uuid::new_v4(), 1, "abc", Utc::now(), entries).unwrap_err();
        assert_eq!(err, DomainError::InvalidEntriesNumber(1));
    }

    #[test]
    fn rejects_unbalanced_entries() {
        let entries = vec![
            entry(
                "liability.clients.available.111",
                Operation::Debit,
                Version::Next,
                123,
            ),
            entry(
                "liability.clients.available.222",
                Operation::Credit,
                Version::Next,
                300,
            ),
        ];
        let err =
            Transaction::new(Uuid::new_v4(), 1, "abc", Utc::now(), entries).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidBalance {
                debits: 123,
                credits: 300
            }
        );
    }

    #[test]
    fn rejects_future_competence_date_beyond_skew() {
        let entries = vec![
            entry(
                "liability.clients.available.111",
                Operation::Debit,
                Version::Next,
                1,
            ),
            entry(
                "liability.clients.available.222",
                Operation::Credit,
                Version::Next,
                1,
            ),
        ];
        let future = Utc::now() + Duration::minutes(5);
        let err = Transaction::new(Uuid::new_v4(), 1, "abc", future, entries).unwrap_err();
        assert_eq!(err, DomainError::InvalidCompetenceDate);
    }

    #[test]
    fn sorts_entries_into_canonical_order() {
        let e1 = entry(
            "liability.clients.available.333",
            Operation::Debit,
            Version::Concrete(1),
            100,
        );
        let e2 = entry(
            "liability.clients.available.333",
            Operation::Debit,
            Version::Concrete(2),
            200,
        );
        let e3 = entry(
            "liability.clients.available.333",
            Operation::Debit,
            Version::Concrete(3),
            300,
        );
        let e4 = entry(
            "liability.clients.available.444",
            Operation::Credit,
            Version::Concrete(4),
            600,
        );

        let unordered = vec![e3.clone(), e4.clone(), e2.clone(), e1.clone()];
        let tx = Transaction::new(Uuid::new_v4(), 1, "abc", Utc::now(), unordered).unwrap();

        let accounts: Vec<_> = tx.entries.iter().map(|e| e.account.value().to_string()).collect();
        let versions: Vec<_> = tx
            .entries
            .iter()
            .map(|e| match e.expected_version {
                Version::Concrete(v) => v,
                _ => unreachable!(),
            })
            .collect();

        assert_eq!(
            accounts,
            vec![
                "liability.clients.available.333",
                "liability.clients.available.333",
                "liability.clients.available.333",
                "liability.clients.available.444",
            ]
        );
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sentinel_versions_sort_after_concrete_on_same_account() {
        let e_concrete = entry(
            "liability.clients.available.111",
            Operation::Debit,
            Version::Concrete(1),
            100,
        );
        let e_ignore = entry(
            "liability.clients.available.111",
            Operation::Debit,
            Version::Ignore,
            50,
        );
        let e_credit = entry(
            "liability.clients.available.222",
            Operation::Credit,
            Version::Next,
            150,
        );

        let tx = Transaction::new(
            Uuid::new_v4(),
            1,
            "abc",
            Utc::now(),
            vec![e_ignore.clone(), e_credit.clone(), e_concrete.clone()],
        )
        .unwrap();

        assert_eq!(tx.entries[0].expected_version, Version::Concrete(1));
        assert_eq!(tx.entries[1].expected_version, Version::Ignore);
    }
}
