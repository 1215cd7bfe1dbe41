//! meshlinkd — thin process launcher.
//!
//! The spec scopes the daemon's actual listener/dispatch loop out
//! ("CLI argument parsing beyond a config path", "plugin hot-reload");
//! this binary only proves the core wires together: load configuration,
//! initialize tracing, and construct a [`meshlink_ircd::pool::Pool`]
//! with the local server registered as root.

use std::path::Path;
use std::sync::Arc;

use meshlink_ircd::{Pool, Server, TomlConfig};
use tracing::{error, info};

fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);
    let raw_path = match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => {
            args.next().unwrap_or_else(|| "config.toml".to_string())
        }
        Some(path) => path,
        None => "config.toml".to_string(),
    };
    match std::fs::canonicalize(Path::new(&raw_path)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => raw_path,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = resolve_config_path();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let config = TomlConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "failed to load configuration");
        e
    })?;

    info!(
        server = %config.server.name,
        network = %config.server.network,
        sid = %config.server.sid,
        "starting meshlinkd"
    );

    let root = Server::new_root(config.server.sid.clone(), config.server.name.clone(), config.server.description.clone());
    let pool = Arc::new(Pool::new());
    pool.register_server(root)?;

    info!(users = pool.user_count(), servers = pool.server_count(), "pool initialized, listener wiring is an application concern");
    Ok(())
}
