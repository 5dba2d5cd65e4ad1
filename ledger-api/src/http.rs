//! JSON/HTTP mirror of the gRPC surface, plus `/metrics` and `/version`
//! (spec.md §4.6 "JSON/HTTP mirror"). Generalizes the original's
//! grpc-gateway reverse proxy into a hand-written `axum` router — more
//! idiomatic in Rust than reverse-proxying gRPC, and matches the teacher's
//! own `axum`-based `api` crate.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Metadata;

use ledger_domain::{AccountEntryRequest, AccountPath, DomainError, Entry, EntryFilter, PageRequest, Transaction};
use ledger_usecase::LedgerUseCase;

use crate::convert::domain_error_to_status;
use crate::metrics;

#[derive(Clone)]
pub struct HttpState {
    pub usecase: Arc<LedgerUseCase>,
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/v1/transactions", post(create_transaction))
        .route("/v1/accounts/:account/balance", get(get_account_balance))
        .route("/v1/accounts/:account/report", get(get_synthetic_report))
        .route("/v1/accounts/:account/entries", get(list_account_entries))
        .route("/metrics", get(metrics_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::render()
}

async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}

fn status_to_response(status: tonic::Status) -> axum::response::Response {
    let code = match status.code() {
        tonic::Code::InvalidArgument => axum::http::StatusCode::BAD_REQUEST,
        tonic::Code::NotFound => axum::http::StatusCode::NOT_FOUND,
        tonic::Code::FailedPrecondition => axum::http::StatusCode::CONFLICT,
        _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(serde_json::json!({ "message": status.message() }))).into_response()
}

#[derive(Deserialize)]
struct WireEntry {
    id: String,
    account: String,
    operation: i32,
    expected_version: i64,
    amount: u64,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Deserialize)]
struct CreateTransactionBody {
    id: String,
    event_code: u32,
    company: String,
    competence_date: DateTime<Utc>,
    entries: Vec<WireEntry>,
}

#[derive(Serialize)]
struct EmptyResponse {}

async fn create_transaction(
    State(state): State<HttpState>,
    Json(body): Json<CreateTransactionBody>,
) -> axum::response::Response {
    let entries: Result<Vec<Entry>, DomainError> = body
        .entries
        .into_iter()
        .map(|e| {
            let version = ledger_domain::Version::from_wire(e.expected_version)?;
            Entry::new(
                uuid::Uuid::parse_str(&e.id).map_err(|_| DomainError::InvalidEntryId)?,
                ledger_domain::Operation::from_wire(e.operation),
                &e.account,
                version,
                e.amount,
                e.metadata,
            )
        })
        .collect();

    let entries = match entries {
        Ok(entries) => entries,
        Err(e) => return status_to_response(domain_error_to_status(e)),
    };

    let id = match uuid::Uuid::parse_str(&body.id) {
        Ok(id) => id,
        Err(_) => return status_to_response(domain_error_to_status(DomainError::InvalidTransactionId)),
    };

    let tx = match Transaction::new(id, body.event_code, body.company, body.competence_date, entries) {
        Ok(tx) => tx,
        Err(e) => return status_to_response(domain_error_to_status(e)),
    };

    match metrics::observe("CreateTransaction", state.usecase.create_transaction(&tx)).await {
        Ok(()) => Json(EmptyResponse {}).into_response(),
        Err(e) => status_to_response(domain_error_to_status(e)),
    }
}

#[derive(Deserialize)]
struct BalanceQuery {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct BalanceResponse {
    account: String,
    current_version: i64,
    balance: i64,
}

async fn get_account_balance(
    State(state): State<HttpState>,
    axum::extract::Path(account): axum::extract::Path<String>,
    Query(query): Query<BalanceQuery>,
) -> axum::response::Response {
    let account = match AccountPath::parse(&account) {
        Ok(account) => account,
        Err(e) => return status_to_response(domain_error_to_status(e)),
    };

    let result = metrics::observe(
        "GetAccountBalance",
        state
            .usecase
            .get_account_balance(&account, query.start_date, query.end_date),
    )
    .await;

    match result {
        Ok(balance) => Json(BalanceResponse {
            account: balance.account,
            current_version: balance.current_version_wire(),
            balance: balance.balance,
        })
        .into_response(),
        Err(e) => status_to_response(domain_error_to_status(e)),
    }
}

#[derive(Deserialize)]
struct ReportQuery {
    #[serde(default)]
    level: usize,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

#[derive(Serialize)]
struct WireAccountResult {
    account: String,
    credit: i64,
    debit: i64,
}

#[derive(Serialize)]
struct ReportResponse {
    total_credit: i64,
    total_debit: i64,
    results: Vec<WireAccountResult>,
}

async fn get_synthetic_report(
    State(state): State<HttpState>,
    axum::extract::Path(account): axum::extract::Path<String>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let account = match AccountPath::parse(&account) {
        Ok(account) => account,
        Err(e) => return status_to_response(domain_error_to_status(e)),
    };

    let result = metrics::observe(
        "GetSyntheticReport",
        state
            .usecase
            .get_synthetic_report(&account, query.level, query.start_date, query.end_date),
    )
    .await;

    match result {
        Ok(report) => Json(ReportResponse {
            total_credit: report.total_credit,
            total_debit: report.total_debit,
            results: report
                .results
                .into_iter()
                .map(|r| WireAccountResult {
                    account: r.account,
                    credit: r.credit,
                    debit: r.debit,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => status_to_response(domain_error_to_status(e)),
    }
}

#[derive(Deserialize)]
struct EntriesQuery {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    #[serde(default)]
    companies: Vec<String>,
    #[serde(default)]
    events: Vec<u32>,
    size: usize,
    cursor: Option<String>,
}

#[derive(Serialize)]
struct EntriesResponse {
    entries: Vec<WireAccountEntry>,
    next_cursor: Option<String>,
}

#[derive(Serialize)]
struct WireAccountEntry {
    id: String,
    account: String,
    version: i64,
    operation: i32,
    amount: u64,
    event_code: u32,
    created_at: DateTime<Utc>,
    competence_date: DateTime<Utc>,
    metadata: Metadata,
}

async fn list_account_entries(
    State(state): State<HttpState>,
    axum::extract::Path(account): axum::extract::Path<String>,
    Query(query): Query<EntriesQuery>,
) -> axum::response::Response {
    let account = match AccountPath::parse(&account) {
        Ok(account) => account,
        Err(e) => return status_to_response(domain_error_to_status(e)),
    };

    let request = AccountEntryRequest {
        account,
        start_date: query.start_date,
        end_date: query.end_date,
        filter: EntryFilter {
            companies: query.companies,
            events: query.events,
            operation: None,
        },
        page: PageRequest {
            size: query.size,
            cursor: query.cursor,
        },
    };

    let result = metrics::observe("ListAccountEntries", state.usecase.list_account_entries(&request)).await;

    match result {
        Ok(page) => Json(EntriesResponse {
            entries: page
                .entries
                .into_iter()
                .map(|e| WireAccountEntry {
                    id: e.id.to_string(),
                    account: e.account,
                    version: e.version,
                    operation: e.operation.to_wire(),
                    amount: e.amount,
                    event_code: e.event_code,
                    created_at: e.created_at,
                    competence_date: e.competence_date,
                    metadata: e.metadata,
                })
                .collect(),
            next_cursor: page.next_cursor,
        })
        .into_response(),
        Err(e) => status_to_response(domain_error_to_status(e)),
    }
}
