//! Logger module
//!
//! Provides logging utilities for the development server including:
//! - Startup banner and shutdown messages
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Print the startup banner
///
/// Always goes to stdout, also when the info log is redirected to a file.
pub fn log_server_start(addr: &SocketAddr, root: &Path, lan_ip: Option<IpAddr>) {
    println!("{}", startup_banner(addr, root, lan_ip));
}

/// Banner text; `lan_ip` is `None` when the outbound interface could not be
/// determined.
fn startup_banner(addr: &SocketAddr, root: &Path, lan_ip: Option<IpAddr>) -> String {
    let port = addr.port();
    let network = match lan_ip {
        Some(ip) => format!("-> http://{}/", SocketAddr::new(ip, port)),
        None => "-> (could not determine local IP)".to_string(),
    };

    [
        "==========================================================".to_string(),
        "  WebGL Development Server".to_string(),
        "==========================================================".to_string(),
        format!("  Serving directory: {}", root.display()),
        format!("  Bound to:          {addr}"),
        String::new(),
        "  Server running at:".to_string(),
        format!("  -> http://localhost:{port}/"),
        format!("  -> http://127.0.0.1:{port}/"),
        String::new(),
        "  Network access:".to_string(),
        format!("  {network}"),
        String::new(),
        "  Features:".to_string(),
        "  + gzip/brotli Content-Encoding for precompressed builds".to_string(),
        "  + CORS enabled for WebAssembly".to_string(),
        "  + PWA manifest and service worker support".to_string(),
        "  + WebGL MIME types configured".to_string(),
        String::new(),
        "  Press Ctrl+C to stop the server".to_string(),
        "==========================================================\n".to_string(),
    ]
    .join("\n")
}

/// Actionable message for a port that is already taken, printed to stderr
pub fn log_port_in_use(port: u16) {
    eprintln!("{}", port_in_use_message(port));
}

fn port_in_use_message(port: u16) -> String {
    let suggestion = if port == 8080 { 8081 } else { 8080 };
    format!(
        "\n[ERROR] Port {port} is already in use!\n        Try a different port: webgl-devserver {suggestion}"
    )
}

pub fn log_shutdown_signal(signal: &str) {
    write_info(&format!("\n[SIGNAL] {signal} received, shutting down"));
}

pub fn log_server_stopped() {
    println!("\nServer stopped.");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
