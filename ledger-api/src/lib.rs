//! RPC facade: the gRPC service implementation plus the JSON/HTTP mirror.

mod convert;
pub mod http;
pub mod interceptor;
pub mod metrics;
mod service;

pub use service::LedgerService;

pub use ledger_proto::health_api_server::HealthApiServer;
pub use ledger_proto::ledger_api_server::LedgerApiServer;
