use std::io;
use std::process::ExitCode;

use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use lawyer_directory::config::AppConfig;
use lawyer_directory::database::open_store;
use lawyer_directory::services::AuthService;
use lawyer_directory::{app, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lawyer_directory=debug")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting lawyer directory in {:?} mode with {:?} store",
        config.environment,
        config.store.backend
    );

    let store = open_store(&config).await?;

    if let Some(admin) = AuthService::new(store.clone()).ensure_admin(&config.bootstrap).await? {
        tracing::info!("Bootstrapped admin account {}", admin.email);
    }

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Listening on http://{}", bind_addr);

    let exit_on_stdin_eof = config.server.exit_on_stdin_eof;
    axum::serve(listener, app(AppState::new(config, store)))
        .with_graceful_shutdown(shutdown_signal(exit_on_stdin_eof))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or when stdin closes if `exit_on_stdin_eof` is set
async fn shutdown_signal(exit_on_stdin_eof: bool) {
    let (eof_tx, eof_rx) = oneshot::channel::<()>();
    if exit_on_stdin_eof {
        // Plain thread: a blocking read on the runtime's pool would stall its shutdown
        std::thread::spawn(move || {
            let _ = io::copy(&mut io::stdin().lock(), &mut io::sink());
            let _ = eof_tx.send(());
        });
    } else {
        drop(eof_tx);
    }

    let stdin_closed = async {
        match eof_rx.await {
            Ok(()) => tracing::info!("stdin closed, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
            Err(e) => {
                tracing::warn!("failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = stdin_closed => {}
    }
}
