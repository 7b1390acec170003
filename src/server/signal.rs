// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown

use crate::logger;

/// Resolve once the process is asked to stop (unix).
#[cfg(unix)]
pub async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_warning(&format!(
                    "Failed to register signal handlers ({e}), falling back to Ctrl+C"
                ));
                wait_for_ctrl_c().await;
                return;
            }
        };

    tokio::select! {
        _ = sigint.recv() => logger::log_shutdown_signal("SIGINT (Ctrl+C)"),
        _ = sigterm.recv() => logger::log_shutdown_signal("SIGTERM"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_shutdown_signal("Ctrl+C"),
        Err(e) => {
            logger::log_error(&format!("Unable to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
