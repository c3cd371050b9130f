// Connection handling module
// Serves one accepted TCP connection with the edge handler

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::EdgeState;
use crate::handler;
use crate::logger;

/// Serve a single connection in a spawned task
///
/// The connection is dropped once `read_timeout` elapses, keep-alive included.
/// `active` tracks open connections so shutdown can wait for them.
pub fn spawn_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<EdgeState>,
    active: Arc<AtomicUsize>,
) {
    logger::log_connection_accepted(&peer_addr);
    active.fetch_add(1, Ordering::SeqCst);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout = Duration::from_secs(state.config.edge.read_timeout);

        let service_state = Arc::clone(&state);
        let conn = http1::Builder::new().keep_alive(true).serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} closed after {} seconds",
                timeout.as_secs()
            )),
        }

        active.fetch_sub(1, Ordering::SeqCst);
    });
}
