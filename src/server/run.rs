// Server run loop
// Accepts connections until a shutdown signal arrives, then drains

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::connection::spawn_connection;
use super::listener::create_reusable_listener;
use super::signal::shutdown_signal;
use crate::config::{Config, EdgeState};
use crate::logger;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the edge server until SIGINT/SIGTERM
pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    logger::log_edge_start(&addr, &config);

    let state = Arc::new(EdgeState::new(config));
    serve_until(listener, state, shutdown_signal()).await;
    Ok(())
}

/// Accept loop; returns once `shutdown` resolves and open connections drained
pub async fn serve_until(
    listener: TcpListener,
    state: Arc<EdgeState>,
    shutdown: impl Future<Output = ()>,
) {
    let active = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, Arc::clone(&state), Arc::clone(&active));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    drop(listener);
    drain(&active).await;
}

/// Wait for open connections to finish, bounded by `DRAIN_TIMEOUT`
async fn drain(active: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown with {} connection(s) still open",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
    logger::log_info("Edge server stopped");
}
