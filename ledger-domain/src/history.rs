use chrono::{DateTime, Utc};
use serde_json::Value as Metadata;
use uuid::Uuid;

use crate::account_path::AccountPath;
use crate::entry::Operation;

/// One row of account history as returned by `StorageEngine::list_account_entries`.
#[derive(Debug, Clone)]
pub struct AccountEntry {
    pub id: Uuid,
    pub account: String,
    pub version: i64,
    pub operation: Operation,
    pub amount: u64,
    pub event_code: u32,
    pub created_at: DateTime<Utc>,
    pub competence_date: DateTime<Utc>,
    pub metadata: Metadata,
}

/// Narrows a history query to a set of companies, event codes, and/or a
/// single operation (spec.md §4.3.5 "Filter semantics").
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub companies: Vec<String>,
    pub events: Vec<u32>,
    /// `None` (or `Operation::Invalid`) means unrestricted.
    pub operation: Option<Operation>,
}

/// Requested page size plus an optional opaque cursor (the encoded form
/// produced by `ledger_pagination::Cursor`).
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub size: usize,
    pub cursor: Option<String>,
}

/// Full request shape for `list_account_entries` (spec.md §4.3.5).
#[derive(Debug, Clone)]
pub struct AccountEntryRequest {
    pub account: AccountPath,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub filter: EntryFilter,
    pub page: PageRequest,
}

/// Result of `list_account_entries`: the page of entries plus the opaque
/// cursor for the next page, `None` at end-of-stream.
#[derive(Debug, Clone)]
pub struct AccountEntryPage {
    pub entries: Vec<AccountEntry>,
    pub next_cursor: Option<String>,
}
