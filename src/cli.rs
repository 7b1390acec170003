//! Command line interface
//!
//! `webgl-devserver [port] [--dir <path>] [--config <file>]`

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "webgl-devserver")]
#[command(about = "Development server for WebGL builds with gzip/brotli aware headers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port to listen on (default: 8000)
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Directory to serve (default: current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
