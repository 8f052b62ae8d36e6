use std::sync::Arc;

use arrrg::CommandLine;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use command_api::{
    AppState, CommandRepository, InMemoryCommandRepository, ServerArgs, ServerConfig,
    StorageBackend, cli_utils, command_mapper, create_command_router,
    sql::{self, PgCommandRepository},
};

const HELP_TEXT: &str = r#"command-apid - Command catalogue daemon

USAGE:
    command-apid [OPTIONS]

OPTIONS:
    --host <HOST>            Host to bind the HTTP server [default: 127.0.0.1]
    --port <PORT>            Port to bind the HTTP server [default: 8080]
    --database-url <URL>     PostgreSQL database URL [default: $DATABASE_URL, else in-memory]
    --log-filter <FILTER>    tracing filter directive [default: info; RUST_LOG wins]
    --verbose                Enable verbose logging

DESCRIPTION:
    Serves the command catalogue under /api/commands. Without a database URL the
    catalogue is kept in memory and lost on shutdown. With one, pending migrations
    are applied at startup.

    The server supports graceful shutdown via Ctrl+C.

API ENDPOINTS:
    GET    /api/commands         List all commands
    POST   /api/commands         Create a command
    GET    /api/commands/{id}    Get a specific command
    PUT    /api/commands/{id}    Replace a command
    PATCH  /api/commands/{id}    Apply a JSON Patch to a command
    DELETE /api/commands/{id}    Delete a command"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = ServerArgs::from_command_line("USAGE: command-apid [OPTIONS]");

    if !free.is_empty() {
        if free[0] == "help" {
            println!("{}", HELP_TEXT);
            return Ok(());
        }
        cli_utils::exit_with_usage_error(
            &format!("Unexpected arguments: {:?}", free),
            "USAGE: command-apid [OPTIONS]",
        );
    }

    let config = ServerConfig::from_args(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let repository: Arc<dyn CommandRepository> = match config.storage() {
        StorageBackend::InMemory => {
            tracing::warn!("no database configured; commands are kept in memory");
            Arc::new(InMemoryCommandRepository::new())
        }
        StorageBackend::Postgres(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .map_err(|e| format!("Failed to connect to database: {}", e))?;
            sql::migrator()
                .run(&pool)
                .await
                .map_err(|e| format!("Failed to run migrations: {}", e))?;
            tracing::info!("connected to PostgreSQL and applied migrations");
            Arc::new(PgCommandRepository::new(pool))
        }
    };

    let state = AppState::new(repository, Arc::new(command_mapper()));
    let app = create_command_router(state).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(%addr, storage = ?config.storage(), "command-apid listening");
    if config.verbose {
        println!("{}", HELP_TEXT);
    }

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                cli_utils::exit_with_error(&format!("Server error: {}", e));
            }
        }
        () = shutdown_signal => {
            tracing::info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}
