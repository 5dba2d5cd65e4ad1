//! Entry point: loads configuration, wires the storage pool, runs
//! migrations, and serves the gRPC and HTTP listeners side by side
//! (spec.md §5, §6; mirrors `cmd/command-handler/main.go`).

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tonic_health::server::health_reporter;
use tracing_subscriber::EnvFilter;

use ledger_api::{HealthApiServer, LedgerApiServer, LedgerService};
use ledger_config::Config;
use ledger_storage::{connect, migrations, PostgresStorage};
use ledger_usecase::LedgerUseCase;

#[derive(Parser, Debug)]
#[command(name = "ledger-server")]
struct Cli {
    /// Path to a config file (TOML/YAML/JSON, auto-detected by extension).
    /// Missing files are tolerated; environment variables still apply.
    #[arg(long, env = "LEDGER_CONFIG_PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    migrations::run(&config.postgres.dsn)
        .await
        .context("running database migrations")?;

    let pool = connect(&config.postgres.dsn, config.postgres.pool_size)
        .await
        .context("connecting to postgres")?;
    let storage = Arc::new(PostgresStorage::new(pool));
    let usecase = Arc::new(LedgerUseCase::new(storage));

    let grpc_addr = format!("{}:{}", config.rpc.host, config.rpc.port)
        .parse()
        .context("parsing rpc listen address")?;
    let http_addr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .context("parsing http listen address")?;

    let service = LedgerService::new(usecase.clone());

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<LedgerApiServer<LedgerService>>()
        .await;

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(ledger_proto::FILE_DESCRIPTOR_SET)
        .build()
        .context("building reflection service")?;

    let grpc_server = tonic::transport::Server::builder()
        .layer(tower_http::trace::TraceLayer::new_for_grpc())
        .layer(tower_http::catch_panic::CatchPanicLayer::new())
        .add_service(LedgerApiServer::with_interceptor(
            service.clone(),
            ledger_api::interceptor::log_request,
        ))
        .add_service(HealthApiServer::with_interceptor(
            service,
            ledger_api::interceptor::log_request,
        ))
        .add_service(health_service)
        .add_service(reflection_service)
        .serve(grpc_addr);

    let http_router = ledger_api::http::router(ledger_api::http::HttpState { usecase });
    let http_server = axum::serve(tokio::net::TcpListener::bind(http_addr).await?, http_router);

    tracing::info!(%grpc_addr, %http_addr, "ledger-server starting");

    tokio::try_join!(
        async { grpc_server.await.context("grpc server") },
        async { http_server.await.context("http server") },
    )?;

    Ok(())
}
