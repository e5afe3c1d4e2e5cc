//! Process signal handling for graceful shutdown.

use tokio::sync::watch;

/// Flip `shutdown` to `true` on Ctrl-C or SIGTERM.
///
/// Returns the name of the signal that fired.
pub async fn watch_shutdown_signals(shutdown: watch::Sender<bool>) -> &'static str {
    let received = wait_for_signal().await;
    tracing::info!(signal = received, "shutdown signal received");
    // The receiver may already be gone if the worker stopped on its own.
    let _ = shutdown.send(true);
    received
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
        },
        Err(err) => {
            tracing::warn!(error = %err, "cannot install SIGTERM handler, listening for Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl-C"
}
