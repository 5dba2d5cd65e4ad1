//! The gRPC service implementation: translates wire messages to domain
//! values, invokes the use-case orchestrator, and maps results back
//! (spec.md §4.6).

use std::sync::Arc;

use tonic::{Request, Response, Status};

use ledger_domain::{AccountEntryRequest, AccountPath, EntryFilter, Operation, PageRequest};
use ledger_usecase::LedgerUseCase;

use ledger_proto::health_api_server::HealthApi;
use ledger_proto::ledger_api_server::LedgerApi;
use ledger_proto::{
    check_response::ServingStatus, AccountEntry as WireAccountEntry, AccountResult as WireAccountResult,
    CheckRequest, CheckResponse, CreateTransactionRequest, CreateTransactionResponse, GetAccountBalanceRequest,
    GetAccountBalanceResponse, GetSyntheticReportRequest, GetSyntheticReportResponse, ListAccountEntriesRequest,
    ListAccountEntriesResponse,
};

use crate::convert::{
    chrono_to_timestamp, domain_error_to_status, entry_from_wire, json_to_struct, timestamp_to_chrono,
    transaction_from_wire,
};
use crate::metrics;

#[derive(Clone)]
pub struct LedgerService {
    usecase: Arc<LedgerUseCase>,
}

impl LedgerService {
    pub fn new(usecase: Arc<LedgerUseCase>) -> Self {
        LedgerService { usecase }
    }

    fn parse_account(text: &str) -> Result<AccountPath, Status> {
        AccountPath::parse(text).map_err(domain_error_to_status)
    }
}

#[tonic::async_trait]
impl LedgerApi for LedgerService {
    async fn create_transaction(
        &self,
        request: Request<CreateTransactionRequest>,
    ) -> Result<Response<CreateTransactionResponse>, Status> {
        let request = request.into_inner();

        let entries = request
            .entries
            .into_iter()
            .map(|e| {
                entry_from_wire(
                    &e.id,
                    &e.account,
                    e.operation,
                    e.expected_version,
                    e.amount,
                    e.metadata,
                )
            })
            .collect::<Result<Vec<_>, Status>>()?;

        let tx = transaction_from_wire(
            &request.id,
            request.event_code,
            &request.company,
            request.competence_date,
            entries,
        )?;

        metrics::observe("CreateTransaction", self.usecase.create_transaction(&tx))
            .await
            .map_err(domain_error_to_status)?;

        Ok(Response::new(CreateTransactionResponse {}))
    }

    async fn get_account_balance(
        &self,
        request: Request<GetAccountBalanceRequest>,
    ) -> Result<Response<GetAccountBalanceResponse>, Status> {
        let request = request.into_inner();
        let account = Self::parse_account(&request.account)?;
        let start = timestamp_to_chrono(request.start_date);
        let end = timestamp_to_chrono(request.end_date);

        let balance = metrics::observe(
            "GetAccountBalance",
            self.usecase.get_account_balance(&account, start, end),
        )
        .await
        .map_err(domain_error_to_status)?;

        Ok(Response::new(GetAccountBalanceResponse {
            account: balance.account,
            current_version: balance.current_version_wire(),
            balance: balance.balance,
        }))
    }

    async fn get_synthetic_report(
        &self,
        request: Request<GetSyntheticReportRequest>,
    ) -> Result<Response<GetSyntheticReportResponse>, Status> {
        let request = request.into_inner();
        let account = Self::parse_account(&request.account_query)?;
        let start = timestamp_to_chrono(request.start_date).unwrap_or_default();
        let end = timestamp_to_chrono(request.end_date).unwrap_or_default();

        let report = metrics::observe(
            "GetSyntheticReport",
            self.usecase
                .get_synthetic_report(&account, request.level as usize, start, end),
        )
        .await
        .map_err(domain_error_to_status)?;

        Ok(Response::new(GetSyntheticReportResponse {
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
        }))
    }

    async fn list_account_entries(
        &self,
        request: Request<ListAccountEntriesRequest>,
    ) -> Result<Response<ListAccountEntriesResponse>, Status> {
        let request = request.into_inner();
        let account = Self::parse_account(&request.account)?;

        let start_date = timestamp_to_chrono(request.start_date).unwrap_or_default();
        let end_date = timestamp_to_chrono(request.end_date).unwrap_or_default();

        let wire_filter = request.filter.unwrap_or_default();
        let filter = EntryFilter {
            companies: wire_filter.companies,
            events: wire_filter.events,
            operation: Some(Operation::from_wire(wire_filter.operation)),
        };

        let wire_page = request.page.unwrap_or_default();
        let page = PageRequest {
            size: wire_page.size as usize,
            cursor: if wire_page.cursor.is_empty() {
                None
            } else {
                Some(wire_page.cursor)
            },
        };

        let domain_request = AccountEntryRequest {
            account,
            start_date,
            end_date,
            filter,
            page,
        };

        let result = metrics::observe(
            "ListAccountEntries",
            self.usecase.list_account_entries(&domain_request),
        )
        .await
        .map_err(domain_error_to_status)?;

        Ok(Response::new(ListAccountEntriesResponse {
            entries: result
                .entries
                .into_iter()
                .map(|e| WireAccountEntry {
                    id: e.id.to_string(),
                    account: e.account,
                    version: e.version,
                    operation: e.operation.to_wire(),
                    amount: e.amount,
                    event_code: e.event_code,
                    created_at: Some(chrono_to_timestamp(e.created_at)),
                    competence_date: Some(chrono_to_timestamp(e.competence_date)),
                    metadata: Some(json_to_struct(&e.metadata)),
                })
                .collect(),
            next_cursor: result.next_cursor.unwrap_or_default(),
        }))
    }
}

#[tonic::async_trait]
impl HealthApi for LedgerService {
    async fn check(&self, _request: Request<CheckRequest>) -> Result<Response<CheckResponse>, Status> {
        Ok(Response::new(CheckResponse {
            status: ServingStatus::Serving as i32,
        }))
    }
}
