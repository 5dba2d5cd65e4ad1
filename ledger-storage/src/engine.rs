//! `StorageEngine` implementation against Postgres via `diesel-async`.
//!
//! Mirrors `app/gateways/db/postgres/ledger/*.go`: one method per storage
//! operation, raw SQL built per-call (mostly `diesel::sql_query` boxed
//! queries) rather than the query DSL, since the account-matching operator
//! and the optional filter/cursor predicates vary per call.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel::sql_types::{BigInt, Integer, Jsonb, SmallInt, Text, Timestamptz, Uuid as SqlUuid};
use diesel::QueryableByName;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::Value as Metadata;
use uuid::Uuid;

use ledger_domain::{
    AccountBalance, AccountEntry, AccountEntryPage, AccountEntryRequest, AccountPath, AccountResult,
    DomainError, Entry, Operation, StorageEngine, SyntheticReport, Transaction, Version,
};
use ledger_pagination::{paginate, Cursor};

use crate::classify;
use crate::models::NewEntryRow;
use crate::pool::ConnectionPool;
use crate::wildcard;

/// Fetch `size + 1` rows so the pagination layer can tell whether another
/// page follows without a separate count query.
const OVERFLOW: usize = 1;

pub struct PostgresStorage {
    pool: ConnectionPool,
}

impl PostgresStorage {
    pub fn new(pool: ConnectionPool) -> Self {
        PostgresStorage { pool }
    }

    async fn checkout(
        &self,
    ) -> Result<diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>, DomainError>
    {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::Internal(format!("checking out connection: {e}")))
    }
}

#[derive(QueryableByName)]
struct BalanceRow {
    #[diesel(sql_type = BigInt)]
    balance: i64,
    #[diesel(sql_type = BigInt)]
    entry_count: i64,
}

#[derive(QueryableByName)]
struct GroupRow {
    #[diesel(sql_type = Text)]
    account: String,
    #[diesel(sql_type = SmallInt)]
    operation: i16,
    #[diesel(sql_type = BigInt)]
    amount: i64,
}

#[derive(QueryableByName)]
struct HistoryRow {
    #[diesel(sql_type = SqlUuid)]
    id: Uuid,
    #[diesel(sql_type = Text)]
    account: String,
    #[diesel(sql_type = BigInt)]
    version: i64,
    #[diesel(sql_type = SmallInt)]
    operation: i16,
    #[diesel(sql_type = BigInt)]
    amount: i64,
    #[diesel(sql_type = Integer)]
    event: i32,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    competence_date: DateTime<Utc>,
    #[diesel(sql_type = Jsonb)]
    metadata: Metadata,
}

/// Sums debits minus... credits minus debits, scoped to `account` (matched
/// with `=` or `~` depending on its kind) and, if given, a half-open
/// `[start, end)` competence date window. Mirrors
/// `get_synthetic_account_balance.go` / `get_bounded_account_balance.go`,
/// generalized to cover `analytic_balance` too (no date bounds).
async fn select_balance(
    conn: &mut AsyncPgConnection,
    account: &AccountPath,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<BalanceRow, DomainError> {
    let operator = wildcard::operator_for(account.kind());
    let mut sql = format!(
        "SELECT \
            coalesce(sum(amount) FILTER (WHERE operation = 2), 0) \
            - coalesce(sum(amount) FILTER (WHERE operation = 1), 0) AS balance, \
            count(*) AS entry_count \
         FROM entry WHERE account {operator} $1"
    );

    let mut next_arg = 2;
    if start.is_some() {
        sql += &format!(" AND competence_date >= ${next_arg}");
        next_arg += 1;
    }
    if end.is_some() {
        sql += &format!(" AND competence_date < ${next_arg}");
    }

    let mut query = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
    query = query.bind::<Text, _>(wildcard::match_value(account));
    if let Some(s) = start {
        query = query.bind::<Timestamptz, _>(s);
    }
    if let Some(e) = end {
        query = query.bind::<Timestamptz, _>(e);
    }

    query
        .get_result(conn)
        .await
        .map_err(|e| classify::classify_read_error(e, account.value()))
}

#[async_trait]
impl StorageEngine for PostgresStorage {
    async fn create_transaction(&self, tx: &Transaction) -> Result<(), DomainError> {
        let used_next = tx
            .entries
            .iter()
            .any(|e| matches!(e.expected_version, Version::Next));

        let rows: Vec<NewEntryRow> = tx
            .entries
            .iter()
            .map(|entry| new_entry_row(tx, entry))
            .collect();

        let mut conn = self.checkout().await?;

        diesel::insert_into(crate::schema::entry::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(|e| classify::classify_write_error(e, used_next))?;

        Ok(())
    }

    async fn analytic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError> {
        let mut conn = self.checkout().await?;
        let row = select_balance(&mut conn, account, None, None).await?;

        if row.entry_count == 0 {
            return Err(DomainError::AccountNotFound(account.value().to_string()));
        }

        let version: Option<i64> = crate::schema::account_version::table
            .filter(crate::schema::account_version::account.eq(account.value()))
            .select(crate::schema::account_version::version)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| classify::classify_read_error(e, account.value()))?;

        Ok(AccountBalance::analytic(
            account,
            Version::Concrete(version.unwrap_or(0) as u64),
            row.balance,
        ))
    }

    async fn synthetic_balance(&self, account: &AccountPath) -> Result<AccountBalance, DomainError> {
        let mut conn = self.checkout().await?;
        let row = select_balance(&mut conn, account, None, None).await?;
        Ok(AccountBalance::synthetic(account, row.balance))
    }

    async fn bounded_balance(
        &self,
        account: &AccountPath,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AccountBalance, DomainError> {
        let mut conn = self.checkout().await?;
        let row = select_balance(&mut conn, account, start, end).await?;
        Ok(AccountBalance::synthetic(account, row.balance))
    }

    async fn synthetic_report(
        &self,
        account: &AccountPath,
        level: usize,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<SyntheticReport, DomainError> {
        let mut conn = self.checkout().await?;

        let operator = wildcard::operator_for(account.kind());
        let mut sql = format!("SELECT account, operation, amount FROM entry WHERE account {operator} $1");

        let mut next_arg = 2;
        if start.is_some() {
            sql += &format!(" AND competence_date >= ${next_arg}");
            next_arg += 1;
        }
        if end.is_some() {
            sql += &format!(" AND competence_date < ${next_arg}");
        }

        let mut query = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
        query = query.bind::<Text, _>(wildcard::match_value(account));
        if let Some(s) = start {
            query = query.bind::<Timestamptz, _>(s);
        }
        if let Some(e) = end {
            query = query.bind::<Timestamptz, _>(e);
        }

        let rows: Vec<GroupRow> = query
            .get_results(&mut conn)
            .await
            .map_err(|e| classify::classify_read_error(e, account.value()))?;

        if rows.is_empty() {
            return Ok(SyntheticReport::empty());
        }

        let level = if level == 0 { account.depth() } else { level };

        let mut groups: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for row in rows {
            let parsed = AccountPath::parse(&row.account)
                .map_err(|_| DomainError::Internal("corrupt account value in storage".into()))?;
            let key = parsed.truncated(level);
            let totals = groups.entry(key).or_insert((0, 0));
            match Operation::from_wire(row.operation as i32) {
                Operation::Credit => totals.0 += row.amount,
                Operation::Debit => totals.1 += row.amount,
                Operation::Invalid => {}
            }
        }

        let mut total_credit = 0i64;
        let mut total_debit = 0i64;
        let results = groups
            .into_iter()
            .map(|(account, (credit, debit))| {
                total_credit += credit;
                total_debit += debit;
                AccountResult {
                    account,
                    credit,
                    debit,
                }
            })
            .collect();

        SyntheticReport::new(total_credit, total_debit, results)
    }

    async fn list_account_entries(
        &self,
        request: &AccountEntryRequest,
    ) -> Result<AccountEntryPage, DomainError> {
        let mut conn = self.checkout().await?;

        let operator = wildcard::operator_for(request.account.kind());
        let mut sql = format!(
            "SELECT id, account, version, operation, amount, event, created_at, competence_date, metadata \
             FROM entry WHERE account {operator} $1 \
             AND competence_date >= $2 AND competence_date < $3"
        );

        let mut binds_text: Vec<String> = Vec::new();
        let mut binds_i32: Vec<i32> = Vec::new();
        let mut binds_i16: Option<i16> = None;
        let mut next_arg = 4;

        if !request.filter.companies.is_empty() {
            sql += &format!(" AND company = ANY(${next_arg})");
            next_arg += 1;
            binds_text = request.filter.companies.clone();
        }

        if !request.filter.events.is_empty() {
            sql += &format!(" AND event = ANY(${next_arg})");
            next_arg += 1;
            binds_i32 = request.filter.events.iter().map(|e| *e as i32).collect();
        }

        if let Some(op) = request.filter.operation {
            if op != Operation::Invalid {
                sql += &format!(" AND operation = ${next_arg}");
                next_arg += 1;
                binds_i16 = Some(op.to_wire() as i16);
            }
        }

        let analytic = matches!(request.account.kind(), ledger_domain::AccountKind::Analytic);
        if let Some(cursor) = &request.page.cursor {
            if analytic {
                let (cd, version) = Cursor::decode_analytic(cursor)?;
                sql += &format!(" AND (competence_date, version) < (${next_arg}, ${})", next_arg + 1);
                next_arg += 2;
                sql += &format!(" ORDER BY competence_date DESC, version DESC LIMIT ${next_arg}");

                let mut query = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
                query = bind_common(query, request, &binds_text, &binds_i32, binds_i16);
                query = query.bind::<Timestamptz, _>(cd).bind::<BigInt, _>(version);
                query = query.bind::<BigInt, _>((request.page.size + OVERFLOW) as i64);

                return finish_page(query, &mut conn, request, true).await;
            } else {
                let (cd, ca, id) = Cursor::decode_synthetic(cursor)?;
                sql += &format!(
                    " AND (competence_date, created_at, id) < (${next_arg}, ${}, ${})",
                    next_arg + 1,
                    next_arg + 2
                );
                next_arg += 3;
                sql += &format!(" ORDER BY competence_date DESC, created_at DESC, id DESC LIMIT ${next_arg}");

                let mut query = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
                query = bind_common(query, request, &binds_text, &binds_i32, binds_i16);
                query = query
                    .bind::<Timestamptz, _>(cd)
                    .bind::<Timestamptz, _>(ca)
                    .bind::<SqlUuid, _>(id);
                query = query.bind::<BigInt, _>((request.page.size + OVERFLOW) as i64);

                return finish_page(query, &mut conn, request, false).await;
            }
        }

        let order = if analytic {
            "ORDER BY competence_date DESC, version DESC"
        } else {
            "ORDER BY competence_date DESC, created_at DESC, id DESC"
        };
        sql += &format!(" {order} LIMIT ${next_arg}");

        let mut query = diesel::sql_query(sql).into_boxed::<diesel::pg::Pg>();
        query = bind_common(query, request, &binds_text, &binds_i32, binds_i16);
        query = query.bind::<BigInt, _>((request.page.size + OVERFLOW) as i64);

        finish_page(query, &mut conn, request, analytic).await
    }
}

type BoxedHistoryQuery<'a> =
    diesel::query_builder::BoxedSqlQuery<'a, diesel::pg::Pg, diesel::query_builder::SqlQuery>;

fn bind_common<'a>(
    mut query: BoxedHistoryQuery<'a>,
    request: &AccountEntryRequest,
    companies: &[String],
    events: &[i32],
    operation: Option<i16>,
) -> BoxedHistoryQuery<'a> {
    use diesel::sql_types::Array;

    query = query
        .bind::<Text, _>(wildcard::match_value(&request.account))
        .bind::<Timestamptz, _>(request.start_date)
        .bind::<Timestamptz, _>(request.end_date);

    if !companies.is_empty() {
        query = query.bind::<Array<Text>, _>(companies.to_vec());
    }
    if !events.is_empty() {
        query = query.bind::<Array<Integer>, _>(events.to_vec());
    }
    if let Some(op) = operation {
        query = query.bind::<SmallInt, _>(op);
    }

    query
}

async fn finish_page(
    query: BoxedHistoryQuery<'_>,
    conn: &mut AsyncPgConnection,
    request: &AccountEntryRequest,
    analytic: bool,
) -> Result<AccountEntryPage, DomainError> {
    let rows: Vec<HistoryRow> = query
        .get_results(conn)
        .await
        .map_err(|e| classify::classify_read_error(e, request.account.value()))?;

    let entries: Vec<AccountEntry> = rows
        .iter()
        .map(|r| AccountEntry {
            id: r.id,
            account: r.account.clone(),
            version: r.version,
            operation: Operation::from_wire(r.operation as i32),
            amount: r.amount as u64,
            event_code: r.event as u32,
            created_at: r.created_at,
            competence_date: r.competence_date,
            metadata: r.metadata.clone(),
        })
        .collect();

    let page = paginate(entries, request.page.size, |e| {
        if analytic {
            Cursor::Analytic {
                competence_date: e.competence_date,
                version: e.version,
            }
            .encode()
        } else {
            Cursor::Synthetic {
                competence_date: e.competence_date,
                created_at: e.created_at,
                id: e.id,
            }
            .encode()
        }
    });

    Ok(AccountEntryPage {
        entries: page.items,
        next_cursor: page.next_cursor,
    })
}

fn new_entry_row(tx: &Transaction, entry: &Entry) -> NewEntryRow {
    NewEntryRow {
        id: entry.id,
        tx_id: tx.id,
        event: tx.event_code as i32,
        operation: entry.operation.to_wire() as i16,
        version: entry.expected_version.to_wire(),
        amount: entry.amount as i64,
        competence_date: tx.competence_date,
        account: entry.account.value().to_string(),
        company: tx.company.clone(),
        metadata: entry.metadata.clone(),
    }
}
