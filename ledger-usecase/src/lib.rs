//! Use-case orchestrator: dispatches each read request to the right storage
//! query based on account kind and whether a date bound was given.
//!
//! Grounded on `app/domain/usecases/get_account_balance.go` and
//! `get_synthetic_report.go`: thin dispatch logic with no business rules of
//! its own beyond picking which `StorageEngine` method answers a request.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use ledger_domain::{
    AccountBalance, AccountEntryPage, AccountEntryRequest, AccountKind, AccountPath, DomainError,
    StorageEngine, SyntheticReport, Transaction,
};

/// Orchestrates reads/writes against a `StorageEngine`, independent of any
/// particular transport.
pub struct LedgerUseCase {
    storage: Arc<dyn StorageEngine>,
}

impl LedgerUseCase {
    pub fn new(storage: Arc<dyn StorageEngine>) -> Self {
        LedgerUseCase { storage }
    }

    pub async fn create_transaction(&self, tx: &Transaction) -> Result<(), DomainError> {
        self.storage.create_transaction(tx).await
    }

    /// If either date bound is given, delegates to `bounded_balance`.
    /// Otherwise dispatches on `account.kind()`: Analytic → `analytic_balance`,
    /// Synthetic → `synthetic_balance`.
    pub async fn get_account_balance(
        &self,
        account: &AccountPath,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<AccountBalance, DomainError> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                return Err(DomainError::InvalidCompetenceDate);
            }
        }

        if start_date.is_some() || end_date.is_some() {
            return self.storage.bounded_balance(account, start_date, end_date).await;
        }

        match account.kind() {
            AccountKind::Analytic => self.storage.analytic_balance(account).await,
            AccountKind::Synthetic => self.storage.synthetic_balance(account).await,
        }
    }

    /// Normalizes `level` (0 means "use the query account's own depth") then
    /// delegates.
    pub async fn get_synthetic_report(
        &self,
        account: &AccountPath,
        level: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SyntheticReport, DomainError> {
        let level = if level == 0 { account.depth() } else { level };
        self.storage
            .synthetic_report(account, level, Some(start), Some(end))
            .await
    }

    /// Pass-through; the cursor is opaque to this layer.
    pub async fn list_account_entries(
        &self,
        request: &AccountEntryRequest,
    ) -> Result<AccountEntryPage, DomainError> {
        self.storage.list_account_entries(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledger_domain::{AccountResult, Entry, EntryFilter, Operation, PageRequest, Version};
    use serde_json::Value as Metadata;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MockStorage {
        analytic_calls: Mutex<Vec<String>>,
        synthetic_calls: Mutex<Vec<String>>,
        bounded_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageEngine for MockStorage {
        async fn create_transaction(&self, _tx: &Transaction) -> Result<(), DomainError> {
            Ok(())
        }

        async fn analytic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError> {
            self.analytic_calls.lock().unwrap().push(account.value().to_string());
            Ok(AccountBalance::analytic(account, Version::Concrete(1), -100))
        }

        async fn synthetic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError> {
            self.synthetic_calls.lock().unwrap().push(account.value().to_string());
            Ok(AccountBalance::synthetic(account, -100))
        }

        async fn bounded_balance(
            &self,
            account: &AccountPath,
            _start: Option<DateTime<Utc>>,
            _end: Option<DateTime<Utc>>,
        ) -> Result<AccountBalance, DomainError> {
            self.bounded_calls.lock().unwrap().push(account.value().to_string());
            Ok(AccountBalance::synthetic(account, -50))
        }

        async fn synthetic_report(
            &self,
            _account: &AccountPath,
            _level: usize,
            _start: Option<DateTime<Utc>>,
            _end: Option<DateTime<Utc>>,
        ) -> Result<SyntheticReport, DomainError> {
            SyntheticReport::new(
                100,
                100,
                vec![
                    AccountResult {
                        account: "liability.assets.credit".into(),
                        credit: 100,
                        debit: 0,
                    },
                    AccountResult {
                        account: "liability.assets.debit".into(),
                        credit: 0,
                        debit: 100,
                    },
                ],
            )
        }

        async fn list_account_entries(
            &self,
            _request: &AccountEntryRequest,
        ) -> Result<AccountEntryPage, DomainError> {
            Ok(AccountEntryPage {
                entries: Vec::new(),
                next_cursor: None,
            })
        }
    }

    fn usecase() -> LedgerUseCase {
        LedgerUseCase::new(Arc::new(MockStorage::default()))
    }

    #[tokio::test]
    async fn dispatches_analytic_account_to_analytic_balance() {
        let uc = usecase();
        let account = AccountPath::parse("liability.clients.available.1").unwrap();
        let balance = uc.get_account_balance(&account, None, None).await.unwrap();
        assert_eq!(balance.balance, -100);
        assert_eq!(balance.current_version, Some(Version::Concrete(1)));
    }

    #[tokio::test]
    async fn dispatches_synthetic_account_to_synthetic_balance() {
        let uc = usecase();
        let account = AccountPath::parse("liability.clients.*").unwrap();
        let balance = uc.get_account_balance(&account, None, None).await.unwrap();
        assert_eq!(balance.current_version, None);
        assert_eq!(balance.balance, -100);
    }

    #[tokio::test]
    async fn any_date_bound_dispatches_to_bounded_balance() {
        let uc = usecase();
        let account = AccountPath::parse("liability.clients.available.1").unwrap();
        let start = Utc::now() - chrono::Duration::hours(25);
        let balance = uc
            .get_account_balance(&account, Some(start), None)
            .await
            .unwrap();
        assert_eq!(balance.balance, -50);
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let uc = usecase();
        let account = AccountPath::parse("liability.clients.available.1").unwrap();
        let now = Utc::now();
        let err = uc
            .get_account_balance(&account, Some(now), Some(now - chrono::Duration::hours(1)))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidCompetenceDate);
    }

    #[tokio::test]
    async fn synthetic_report_normalizes_zero_level_to_account_depth() {
        let uc = usecase();
        let account = AccountPath::parse("liability.assets.*").unwrap();
        let now = Utc::now();
        let report = uc
            .get_synthetic_report(&account, 0, now - chrono::Duration::hours(1), now)
            .await
            .unwrap();
        assert_eq!(report.total_credit, 100);
        assert_eq!(report.total_debit, 100);
        assert_eq!(report.results.len(), 2);
    }

    #[tokio::test]
    async fn create_transaction_passes_through() {
        let uc = usecase();
        let entries = vec![
            Entry::new(
                Uuid::new_v4(),
                Operation::Debit,
                "liability.clients.available.1",
                Version::Next,
                100,
                Metadata::Null,
            )
            .unwrap(),
            Entry::new(
                Uuid::new_v4(),
                Operation::Credit,
                "liability.clients.available.2",
                Version::Next,
                100,
                Metadata::Null,
            )
            .unwrap(),
        ];
        let tx = Transaction::new(Uuid::new_v4(), 1, "acme", Utc::now(), entries).unwrap();
        uc.create_transaction(&tx).await.unwrap();
    }

    #[tokio::test]
    async fn list_account_entries_passes_through_unchanged() {
        let uc = usecase();
        let account = AccountPath::parse("liability.clients.available.1").unwrap();
        let now = Utc::now();
        let request = AccountEntryRequest {
            account,
            start_date: now - chrono::Duration::days(1),
            end_date: now,
            filter: EntryFilter::default(),
            page: PageRequest { size: 5, cursor: None },
        };
        let page = uc.list_account_entries(&request).await.unwrap();
        assert!(page.entries.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
