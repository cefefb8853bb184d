//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGTERM/SIGINT (shutdown) and SIGHUP (reload)
//! - Translate them into shutdown broadcasts and registry refreshes

use std::sync::Arc;

use crate::application::ApplicationRegistry;
use crate::lifecycle::Shutdown;

/// What a received signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown,
    Reload,
}

/// Wait for the next relevant signal.
#[cfg(unix)]
pub async fn next_signal() -> std::io::Result<SignalAction> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| SignalAction::Shutdown),
        _ = terminate.recv() => Ok(SignalAction::Shutdown),
        _ = hangup.recv() => Ok(SignalAction::Reload),
    }
}

/// Wait for the next relevant signal.
#[cfg(not(unix))]
pub async fn next_signal() -> std::io::Result<SignalAction> {
    tokio::signal::ctrl_c().await.map(|_| SignalAction::Shutdown)
}

/// Handle signals until a shutdown is requested.
pub async fn run_signal_loop(shutdown: Arc<Shutdown>, registry: Arc<ApplicationRegistry>) {
    loop {
        match next_signal().await {
            Ok(SignalAction::Reload) => {
                tracing::info!("SIGHUP received, reloading applications");
                match registry.refresh() {
                    Ok(count) => tracing::info!(applications = count, "Applications reloaded"),
                    Err(e) => tracing::error!(error = %e, "Reload failed, keeping current applications"),
                }
            }
            Ok(SignalAction::Shutdown) => {
                tracing::info!("Shutdown signal received");
                shutdown.trigger();
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                shutdown.trigger();
                return;
            }
        }
    }
}
