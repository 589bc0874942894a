//! PasteVault server entrypoint.

use pastevault_core::{SweepSchedule, Sweeper, DEFAULT_PORT};
use pastevault_server::{
    config::Config, serve_router, AppState, Database, PasteCipher, PasteStore, StoreLimits,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sweep: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" => flags.help = true,
            "--sweep" => flags.sweep = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn runs_maintenance_mode(flags: CliFlags) -> bool {
    flags.sweep
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pastevault=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env()?;
    let database = Arc::new(Database::new(&config.db_path)?);
    let cipher = PasteCipher::new(&config.encryption_key);
    let store = Arc::new(PasteStore::new(
        database,
        cipher,
        StoreLimits::from_config(&config),
    ));

    if runs_maintenance_mode(cli_flags) {
        let removed = store.expire_older_than(config.retention).await?;
        println!("Removed {} expired paste(s)", removed);
        return Ok(());
    }

    let sweeper = Sweeper::spawn(store.clone(), SweepSchedule::from_config(&config));
    let state = AppState::new(config.clone(), store);

    let allow_public = pastevault_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_override = std::env::var("BIND").ok();
    let bind_addr =
        pastevault_server::resolve_bind_address(&config, bind_override.as_deref(), allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("PasteVault running at http://{}", actual_addr);

    let serve_result = serve_router(listener, state, allow_public, shutdown_signal()).await;

    // Requests have drained; let any in-flight sweep finish before the
    // database handle goes away.
    sweeper.shutdown().await;

    serve_result?;

    Ok(())
}

fn print_help() {
    println!("PasteVault Server\n");
    println!("Usage: pastevault [OPTIONS]\n");
    println!("Options:");
    println!("  --sweep           Purge expired pastes once and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  ENCRYPTION_KEY    Required. 64 hex characters (32-byte AES-256 key)");
    println!("  DB_PATH           Database directory (default: ~/.cache/pastevault/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  MAX_PASTE_SIZE    Maximum paste size in bytes (default: 1000000)");
    println!("  RETENTION_DAYS    Days a paste is kept (default: 30)");
    println!("  SWEEP_INTERVAL_SECS  Seconds between expiry sweeps (default: 86400)");
    println!("  STORAGE_TIMEOUT_MS   Per storage call timeout (default: 5000)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
