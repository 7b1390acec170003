// Connection handling module
// Serves a single accepted TCP connection with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned local task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive from the performance settings
/// 3. Bounds the wait for each request head by `connection_timeout`
/// 4. Serves the connection with the request handler
///
/// The timeout covers idle keep-alive time and slow request headers only;
/// a response body that is still being written is never cut off.
/// A `connection_timeout` of 0 disables it.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - Remote address, recorded in the access log
/// * `state` - Shared application state
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_secs = performance.connection_timeout;
        let header_timeout = (timeout_secs > 0).then_some(Duration::from_secs(timeout_secs));

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(performance.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(header_timeout);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, peer_addr, Arc::clone(&service_state))
            }),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} idle for {timeout_secs} seconds, closing"
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
