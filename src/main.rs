use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use cli::Cli;
use error::StartupError;

fn main() -> ExitCode {
    // Invalid arguments exit here with a usage message, before any socket exists
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(StartupError::AddrInUse { port }) => {
            logger::log_port_in_use(port);
            ExitCode::FAILURE
        }
        Err(e) => {
            logger::log_error(&format!("Fatal startup error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), StartupError> {
    let cfg = config::Config::load(cli)?;
    logger::init(&cfg)?;

    // Handlers share only immutable state
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let root = cfg.resolve_root()?;
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr)?;

    logger::log_server_start(&addr, &root, server::discover_lan_ip());

    let state = Arc::new(config::AppState::new(cfg, root));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            server::wait_for_shutdown(),
        ))
        .await;

    logger::log_server_stopped();
    Ok(())
}
