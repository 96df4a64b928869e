//! ProjectDesk CLI and Server Binary
//!
//! `projectdesk serve` (the default) starts the HTTP API; `projectdesk check`
//! validates the environment configuration and prints a report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cli::{Cli, Commands, ServeArgs};
use config::{validate_config, DatabaseSettings, DeskConfig, StoreBackend, ValidationReport};
use desk::store::postgres::PgDatabase;
use desk::{
    create_router, DeskService, InMemoryMessageStore, InMemoryOrderStore, MessageStore, Notifier,
    OrderStore, PostgresMessageStore, PostgresOrderStore,
};
use observability::{init_logging, init_metrics, LogFormat};
use server::{HttpServer, ServerConfig, ServerExt};
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "projectdesk";

/// How long pending confirmation mails may delay exit
const NOTIFY_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Seed the environment before anything reads it
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse_args();

    match cli.into_command() {
        Commands::Serve(args) => serve(args, dotenv).await,
        Commands::Check => check(),
    }
}

async fn serve(args: ServeArgs, dotenv: Result<PathBuf, dotenvy::Error>) -> Result<()> {
    init_logging(SERVICE_NAME, startup_log_format(&args))?;

    let mut config = DeskConfig::from_env().context("Failed to read configuration")?;
    apply_overrides(&mut config, &args);

    let report = validate_config(&config);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to load .env"),
    }

    for warning in &report.warnings {
        warn!(field = %warning.field, detail = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start due to configuration errors");
    }

    if let Some(port) = config.metrics_port {
        init_metrics(port).context("Failed to start metrics exporter")?;
    }

    let (orders, messages) = open_stores(&config).await?;

    let notifier = match Notifier::from_settings(config.mail.as_ref()) {
        Ok(notifier) => notifier,
        Err(e) => {
            warn!(error = %e, "Mail configuration unusable, confirmation mails disabled");
            Notifier::disabled()
        }
    };
    info!(enabled = notifier.is_enabled(), "Confirmation mail");

    let service = DeskService::new(orders, messages, notifier.clone());
    let server = HttpServer::new(
        ServerConfig::new(config.http.host.clone(), config.http.port),
        create_router(service),
    );

    server.run_with_signals().await?;

    if notifier.drain(NOTIFY_GRACE).await {
        info!("Pending confirmation mails finished");
    } else {
        warn!(
            pending = notifier.pending(),
            "Exiting with confirmation mails still in flight"
        );
    }

    info!("ProjectDesk stopped");
    Ok(())
}

/// Format from `--log-format` or `LOG_FORMAT`, needed before the rest of the
/// configuration is read
///
/// An unknown value falls back to the default here and is reported by
/// validation.
fn startup_log_format(args: &ServeArgs) -> LogFormat {
    let requested = match args.log_format {
        Some(format) => format.as_str().to_string(),
        None => std::env::var("LOG_FORMAT").unwrap_or_default(),
    };
    requested.parse().unwrap_or_default()
}

/// Apply `serve` flags over the environment values
fn apply_overrides(config: &mut DeskConfig, args: &ServeArgs) {
    let mut overridden = Vec::new();

    if let Some(host) = &args.host {
        config.http.host = host.clone();
        overridden.push("HOST");
    }
    if let Some(port) = args.port {
        config.http.port = port;
        overridden.push("PORT");
    }
    if let Some(store) = args.store {
        config.database.backend = match store {
            cli::StoreArg::Postgres => StoreBackend::Postgres,
            cli::StoreArg::Memory => StoreBackend::Memory,
        };
        overridden.push("STORE_BACKEND");
    }
    if let Some(format) = args.log_format {
        config.log_format = format.as_str().to_string();
        overridden.push("LOG_FORMAT");
    }

    config
        .defaults_applied
        .retain(|default| !overridden.contains(&default.field.as_str()));
}

async fn open_stores(config: &DeskConfig) -> Result<(Arc<dyn OrderStore>, Arc<dyn MessageStore>)> {
    let database: &DatabaseSettings = &config.database;

    match database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; records are lost on exit");
            Ok((
                Arc::new(InMemoryOrderStore::new()),
                Arc::new(InMemoryMessageStore::new()),
            ))
        }
        StoreBackend::Postgres => {
            info!(
                database = %config.masked_database_url(),
                max_connections = database.max_connections,
                "Using PostgreSQL store"
            );

            let db = PgDatabase::connect_lazy(&database.url, database.max_connections)
                .context("Failed to create database pool")?;
            let db = Arc::new(db);

            if let Err(e) = db.ensure_schema().await {
                error!(
                    error = %e,
                    "Schema bootstrap failed; retried on the next request"
                );
            }

            Ok((
                Arc::new(PostgresOrderStore::new(db.clone())),
                Arc::new(PostgresMessageStore::new(db)),
            ))
        }
    }
}

fn check() -> Result<()> {
    let config = DeskConfig::from_env().context("Failed to read configuration")?;
    let report = validate_config(&config);

    print_report(&report);

    if !report.is_valid() {
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("HTTP:     {}:{}", config.http.host, config.http.port);
    println!("Store:    {}", config.database.backend);
    if config.database.backend == StoreBackend::Postgres {
        println!(
            "Database: {} (pool of {})",
            config.masked_database_url(),
            config.database.max_connections
        );
    }
    match &config.mail {
        Some(mail) => println!("Mail:     {} via {}", mail.sender(), mail.smtp_host),
        None => println!("Mail:     disabled"),
    }
    println!("Logging:  {}", config.log_format);
    match config.metrics_port {
        Some(port) => println!("Metrics:  0.0.0.0:{}/metrics", port),
        None => println!("Metrics:  disabled"),
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli::LogFormatArg;

    #[test]
    fn test_log_format_flag_wins_before_config_is_read() {
        let args = ServeArgs {
            log_format: Some(LogFormatArg::Json),
            ..Default::default()
        };

        assert_eq!(startup_log_format(&args), LogFormat::Json);
    }
}
