//! CLI arguments and server configuration defaults.

use clap::Parser;
use shadow_rs::formatcp;

use crate::build;

const VERSION_INFO: &str = formatcp!(
    r#"{}\ncommit_hash: {}\nbuild_time: {}\nbuild_env: {},{}"#,
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    build::BUILD_TIME,
    build::RUST_VERSION,
    build::RUST_CHANNEL
);

/// Fixed read size for file streaming; the final chunk may be shorter.
pub const CHUNK_SIZE: usize = 4096;
/// Challenge sent with every 401.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="swiv""#;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8008;

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "swiv", version = VERSION_INFO, about = "Serve a directory tree as a browsable image gallery")]
pub struct Args {
    #[arg(
        short = 'd',
        long,
        env = "SWIV_ROOT",
        default_value = ".",
        help = "Directory to serve as the gallery root"
    )]
    pub root: String,
    #[arg(
        long,
        env = "AUTH",
        hide_env_values = true,
        help = "Shared Basic-auth secret (unset or empty disables auth)"
    )]
    pub auth: Option<String>,
    #[arg(
        short = 'b',
        long,
        env = "SWIV_BIND",
        default_value = DEFAULT_HOST,
        help = "Bind address"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "SWIV_PORT",
        default_value_t = DEFAULT_PORT,
        help = "HTTP port"
    )]
    pub port: u16,
}
