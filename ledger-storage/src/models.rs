use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as Metadata;
use uuid::Uuid;

use crate::schema::entry;

/// One row of `entry` as inserted by `create_transaction`. `version` carries
/// the caller's requested wire value (concrete, `-2`, or `-1`); the
/// `check_account_version` trigger rewrites it to the resolved concrete
/// version in place, except for `-1` which passes through untouched.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entry)]
pub struct NewEntryRow {
    pub id: Uuid,
    pub tx_id: Uuid,
    pub event: i32,
    pub operation: i16,
    pub version: i64,
    pub amount: i64,
    pub competence_date: DateTime<Utc>,
    pub account: String,
    pub company: String,
    pub metadata: Metadata,
}

/// A row read back from `entry`, used by the history reader.
#[derive(Debug, Clone, Queryable, QueryableByName)]
#[diesel(table_name = entry)]
pub struct EntryRow {
    pub id: Uuid,
    pub tx_id: Uuid,
    pub event: i32,
    pub operation: i16,
    pub version: i64,
    pub amount: i64,
    pub competence_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub account: String,
    pub company: String,
    pub metadata: Metadata,
}
