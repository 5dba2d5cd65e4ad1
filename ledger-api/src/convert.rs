//! Wire ↔ domain conversions and the domain-error-to-status mapping
//! (spec.md §4.6, §7).

use chrono::{DateTime, TimeZone, Utc};
use prost_types::{value::Kind, ListValue, Struct, Timestamp, Value as ProstValue};
use serde_json::{Map, Value as Metadata};
use tonic::Status;
use uuid::Uuid;

use ledger_domain::{DomainError, Entry, Operation, Transaction, Version};

pub fn parse_uuid(raw: &str, on_empty: DomainError) -> Result<Uuid, Status> {
    if raw.is_empty() {
        return Err(domain_error_to_status(on_empty));
    }
    Uuid::parse_str(raw)
        .map_err(|_| Status::invalid_argument(format!("malformed uuid: {raw}")))
}

pub fn timestamp_to_chrono(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    let ts = ts?;
    Utc.timestamp_opt(ts.seconds, ts.nanos.max(0) as u32).single()
}

pub fn chrono_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

pub fn struct_to_json(value: &Struct) -> Metadata {
    let mut map = Map::new();
    for (key, value) in &value.fields {
        map.insert(key.clone(), prost_value_to_json(value));
    }
    Metadata::Object(map)
}

fn prost_value_to_json(value: &ProstValue) -> Metadata {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Metadata::Null,
        Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(*n)
            .map(Metadata::Number)
            .unwrap_or(Metadata::Null),
        Some(Kind::StringValue(s)) => Metadata::String(s.clone()),
        Some(Kind::BoolValue(b)) => Metadata::Bool(*b),
        Some(Kind::StructValue(s)) => struct_to_json(s),
        Some(Kind::ListValue(l)) => Metadata::Array(l.values.iter().map(prost_value_to_json).collect()),
    }
}

pub fn json_to_struct(value: &Metadata) -> Struct {
    match value {
        Metadata::Object(map) => Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_prost_value(v)))
                .collect(),
        },
        _ => Struct::default(),
    }
}

fn json_to_prost_value(value: &Metadata) -> ProstValue {
    let kind = match value {
        Metadata::Null => Kind::NullValue(0),
        Metadata::Bool(b) => Kind::BoolValue(*b),
        Metadata::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Metadata::String(s) => Kind::StringValue(s.clone()),
        Metadata::Array(items) => Kind::ListValue(ListValue {
            values: items.iter().map(json_to_prost_value).collect(),
        }),
        Metadata::Object(_) => Kind::StructValue(json_to_struct(value)),
    };
    ProstValue { kind: Some(kind) }
}

/// Builds a domain `Entry` from wire fields, mapping value-object failures
/// straight through (spec.md §4.6 "(a) parses raw request into domain
/// values, returning InvalidArgument on value-object failures").
pub fn entry_from_wire(
    id: &str,
    account: &str,
    operation: i32,
    expected_version: i64,
    amount: u64,
    metadata: Option<Struct>,
) -> Result<Entry, Status> {
    let id = parse_uuid(id, DomainError::InvalidEntryId)?;
    let operation = Operation::from_wire(operation);
    let expected_version = Version::from_wire(expected_version).map_err(domain_error_to_status)?;
    let metadata = metadata.map(|s| struct_to_json(&s)).unwrap_or(Metadata::Null);

    Entry::new(id, operation, account, expected_version, amount, metadata).map_err(domain_error_to_status)
}

pub fn transaction_from_wire(
    id: &str,
    event_code: u32,
    company: &str,
    competence_date: Option<Timestamp>,
    entries: Vec<Entry>,
) -> Result<Transaction, Status> {
    let id = parse_uuid(id, DomainError::InvalidTransactionId)?;
    let competence_date = timestamp_to_chrono(competence_date)
        .ok_or_else(|| domain_error_to_status(DomainError::InvalidCompetenceDate))?;

    Transaction::new(id, event_code, company, competence_date, entries).map_err(domain_error_to_status)
}

/// Maps a `DomainError` to its transport status, per the taxonomy table
/// (spec.md §7).
pub fn domain_error_to_status(err: DomainError) -> Status {
    match err {
        DomainError::InvalidTransactionId
        | DomainError::InvalidEntryId
        | DomainError::InvalidAccount(_)
        | DomainError::InvalidAccountComponentCharacters
        | DomainError::InvalidDepth { .. }
        | DomainError::InvalidOperation
        | DomainError::InvalidAmount
        | DomainError::InvalidVersion
        | DomainError::InvalidMetadata
        | DomainError::InvalidEntriesNumber(_)
        | DomainError::InvalidBalance { .. }
        | DomainError::InvalidCompetenceDate
        | DomainError::InvalidPageCursor
        | DomainError::InvalidAccountType => Status::invalid_argument(err.to_string()),

        DomainError::IdempotencyKeyViolation => Status::invalid_argument(err.to_string()),

        DomainError::ConcurrentVersionConflict { used_next } => {
            let mut status = Status::failed_precondition(err.to_string());
            if used_next {
                status.metadata_mut().insert(
                    "retryable",
                    tonic::metadata::MetadataValue::from_static("true"),
                );
            }
            status
        }

        DomainError::AccountNotFound(_) => Status::not_found(err.to_string()),

        DomainError::Internal(message) => {
            tracing::error!(error = %message, "internal storage error");
            Status::internal("internal error")
        }
    }
}
