// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM stop the edge server. In-flight requests are
// allowed to finish; no new connections are accepted.

/// Resolve once a shutdown signal has been received
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            crate::logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => crate::logger::log_info("SIGINT received, shutting down"),
        _ = sigterm.recv() => crate::logger::log_info("SIGTERM received, shutting down"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        crate::logger::log_info("Ctrl+C received, shutting down");
    }
}
