use chrono::{DateTime, Utc};

use crate::account_path::AccountPath;
use crate::balance::{AccountBalance, SyntheticReport};
use crate::error::DomainError;
use crate::history::{AccountEntryPage, AccountEntryRequest};
use crate::transaction::Transaction;

/// The storage port the use-case orchestrator drives (spec.md §4.3 /
/// `repository.go` in the original). `ledger-storage` provides the Postgres
/// implementation; keeping the trait here (rather than in `ledger-storage`)
/// lets `ledger-usecase` depend only on the domain crate, never on the
/// concrete persistence stack.
#[async_trait::async_trait]
pub trait StorageEngine: Send + Sync {
    /// Appends a transaction's entries atomically, enforcing idempotency
    /// and per-account version advance (spec.md §4.3.2).
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Sum of (credits − debits) for a single analytic account, with its
    /// current version (spec.md §4.3.3).
    async fn analytic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError>;

    /// Sum of (credits − debits) across all accounts matching a synthetic
    /// pattern (spec.md §4.3.3).
    async fn synthetic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError>;

    /// As above, restricted to `competence_date` within `[start, end)`;
    /// either bound may be absent, meaning unbounded on that side
    /// (spec.md §4.3.3).
    async fn bounded_balance(
        &self,
        account: &AccountPath,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AccountBalance, DomainError>;

    /// Credit/debit rollup per account group truncated to `level`
    /// components, within `[start, end)` (spec.md §4.3.4).
    async fn synthetic_report(
        &self,
        account: &AccountPath,
        level: usize,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<SyntheticReport, DomainError>;

    /// Paginated entry history, ordered and cursored according to the
    /// account's kind (spec.md §4.3.5).
    async fn list_account_entries(
        &self,
        request: &AccountEntryRequest,
    ) -> Result<AccountEntryPage, DomainError>;
}
