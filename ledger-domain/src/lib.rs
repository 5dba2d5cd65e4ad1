//! Value objects and construction-time invariants for the double-entry
//! ledger domain: account paths, entries, transactions, balances, and the
//! shared domain error taxonomy.

mod account_path;
mod balance;
mod entry;
mod error;
mod history;
mod storage_engine;
mod transaction;
mod version;

pub use account_path::{AccountKind, AccountPath, MIN_DEPTH, SEPARATOR, WILDCARD};
pub use balance::{AccountBalance, AccountResult, SyntheticReport, SYNTHETIC_CURRENT_VERSION};
pub use entry::{Entry, Operation};
pub use error::DomainError;
pub use history::{AccountEntry, AccountEntryPage, AccountEntryRequest, EntryFilter, PageRequest};
pub use storage_engine::StorageEngine;
pub use transaction::{Transaction, COMPETENCE_DATE_CLOCK_SKEW, MIN_ENTRIES};
pub use version::Version;
