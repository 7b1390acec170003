// LAN address discovery
// Used only for the startup banner

use std::net::{IpAddr, UdpSocket};

/// Public address used to pick the outbound interface. No packet is sent.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Best-effort local network IP of this machine.
///
/// "Connecting" a UDP socket only selects a route, so the local address of
/// the socket is the outbound interface's IP. Any failure yields `None`.
pub fn discover_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(PROBE_ADDR).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}
