// Listener module
// Creates the TCP listener and classifies bind failures

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::StartupError;

/// Bind the server socket.
///
/// `AddrInUse` is reported separately so the caller can suggest another
/// port; every other failure is returned as `StartupError::Bind`.
pub fn bind_listener(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    create_listener(addr).map_err(|source| {
        if source.kind() == io::ErrorKind::AddrInUse {
            StartupError::AddrInUse { port: addr.port() }
        } else {
            StartupError::Bind { addr, source }
        }
    })
}

/// Create a `TcpListener` through `socket2`.
///
/// `SO_REUSEADDR` is set on unix so a restart is not blocked by sockets in
/// `TIME_WAIT`. `SO_REUSEPORT` stays off so a second instance on the same
/// port fails to bind.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    // socket2::Socket -> std::net::TcpListener -> tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
