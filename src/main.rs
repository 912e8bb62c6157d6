use std::process::ExitCode;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use portainer_restarter::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            tracing::error!("Fatal error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log_level);

    let restarter = match portainer_restarter::build_restarter(&config) {
        Ok(restarter) => restarter,
        Err(e) => {
            tracing::error!("Fatal error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        _ = restarter.run() => {},
        _ = shutdown_signal() => {},
    }

    ExitCode::SUCCESS
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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

    tracing::info!("Shutting down...");
}
