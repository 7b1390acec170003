// Server module entry point
// Listener creation, connection serving, shutdown signals and LAN discovery

pub mod connection;
pub mod lan;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use lan::discover_lan_ip;
pub use listener::bind_listener;
pub use server_loop::start_server_loop;
pub use signal::wait_for_shutdown;
