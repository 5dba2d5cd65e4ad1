//! Generated gRPC message and service types for the ledger API, modeled on
//! the original's `gen/ledger/v1beta` package
//! (`examples/original_source/app/gateways/rpc/accounts.go`,
//! `app/gateways/rpc/server.go`).

tonic::include_proto!("ledger.v1");

/// Encoded `FileDescriptorSet`, consumed by `tonic_reflection` so operators
/// can introspect the service with `grpcurl`/`evans` without a checked-in
/// `.proto` copy.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("ledger_descriptor");

