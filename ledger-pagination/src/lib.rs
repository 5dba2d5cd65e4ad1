//! Opaque page cursor for [`ledger_storage`]'s history reader.
//!
//! Two shapes exist because analytic and synthetic account queries order
//! rows differently (spec.md §4.3.5): analytic history has a strictly
//! monotonic per-account version to key off; synthetic history crosses
//! accounts and must lean on insert-time ordering disambiguated by entry id.
//! The cursor carries its shape as part of the encoded value so a cursor
//! built for one account kind is rejected, rather than silently
//! misinterpreted, when presented against the other.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ledger_domain::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed, decoded cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    Analytic {
        competence_date: DateTime<Utc>,
        version: i64,
    },
    Synthetic {
        competence_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
        id: Uuid,
    },
}

impl Cursor {
    /// Deterministic, URL-safe encoding: same content always yields the same
    /// token.
    pub fn encode(&self) -> String {
        let bytes = bincode::serialize(self).expect("Cursor serialization is infallible");
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decodes a token produced by [`Cursor::encode`]. Fails with
    /// `InvalidPageCursor` if the token is malformed.
    pub fn decode(token: &str) -> Result<Self, DomainError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| DomainError::InvalidPageCursor)?;
        bincode::deserialize(&bytes).map_err(|_| DomainError::InvalidPageCursor)
    }

    /// Decodes and asserts the cursor matches the expected shape for the
    /// account kind driving the current request.
    pub fn decode_analytic(token: &str) -> Result<(DateTime<Utc>, i64), DomainError> {
        match Self::decode(token)? {
            Cursor::Analytic {
                competence_date,
                version,
            } => Ok((competence_date, version)),
            Cursor::Synthetic { .. } => Err(DomainError::InvalidPageCursor),
        }
    }

    pub fn decode_synthetic(token: &str) -> Result<(DateTime<Utc>, DateTime<Utc>, Uuid), DomainError> {
        match Self::decode(token)? {
            Cursor::Synthetic {
                competence_date,
                created_at,
                id,
            } => Ok((competence_date, created_at, id)),
            Cursor::Analytic { .. } => Err(DomainError::InvalidPageCursor),
        }
    }
}

/// A page of results plus the cursor to fetch the next one, or `None` at
/// end-of-stream (spec.md §4.3.5 pagination protocol).
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Applies the "request `size + 1`, trim the last row into a cursor"
/// protocol shared by both the analytic and synthetic history queries.
pub fn paginate<T>(mut rows: Vec<T>, size: usize, cursor_of: impl FnOnce(&T) -> String) -> Page<T> {
    if rows.len() <= size {
        return Page {
            items: rows,
            next_cursor: None,
        };
    }

    let overflow = rows.pop().expect("len > size implies non-empty");
    let next_cursor = Some(cursor_of(&overflow));

    Page {
        items: rows,
        next_cursor,
    }
}
