//! Daemon configuration.
//!
//! [`ServerArgs`] is parsed from the command line; [`ServerConfig`] resolves it against the
//! environment and fills in defaults.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

/// Default host the daemon binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port the daemon binds to.
pub const DEFAULT_PORT: u16 = 8080;
/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Environment variable consulted when `--database-url` is not given.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Command-line arguments of `command-apid`.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ServerArgs {
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(optional, "PostgreSQL database URL; commands are kept in memory when absent")]
    database_url: Option<String>,
    #[arrrg(optional, "tracing filter directive, overridden by RUST_LOG")]
    log_filter: Option<String>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

/// Where commands are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// A process-local store that is lost on shutdown.
    InMemory,
    /// PostgreSQL at the given connection URL.
    Postgres(String),
}

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// PostgreSQL URL, if any.
    pub database_url: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Print startup details and lower the default filter to `debug`.
    pub verbose: bool,
}

impl ServerConfig {
    /// Resolves `args`, consulting `DATABASE_URL` when no database URL was passed.
    pub fn from_args(args: ServerArgs) -> Self {
        Self::from_args_and_env(args, |key| std::env::var(key).ok())
    }

    /// Resolves `args` against an arbitrary environment lookup.
    pub fn from_args_and_env(args: ServerArgs, env: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = args
            .database_url
            .or_else(|| env(DATABASE_URL_ENV))
            .filter(|url| !url.trim().is_empty());
        let log_filter = args.log_filter.unwrap_or_else(|| {
            if args.verbose {
                "debug".to_string()
            } else {
                DEFAULT_LOG_FILTER.to_string()
            }
        });
        Self {
            host: args.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.unwrap_or(DEFAULT_PORT),
            database_url,
            log_filter,
            verbose: args.verbose,
        }
    }

    /// Returns `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the storage backend implied by the database URL.
    pub fn storage(&self) -> StorageBackend {
        match &self.database_url {
            Some(url) => StorageBackend::Postgres(url.clone()),
            None => StorageBackend::InMemory,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_args_and_env(ServerArgs::default(), |_| None)
    }
}
