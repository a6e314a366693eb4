use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use dotenvy::dotenv;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BIND_ADDR is not a valid socket address: {0}")]
    BindAddr(#[from] std::net::AddrParseError),
    #[error("workspace limit is not a number: {0}")]
    WorkspaceLimit(#[from] std::num::ParseIntError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub assets_dir: PathBuf,
    pub workspace_capacity: usize,
    pub workspace_idle: Duration,
}

impl Config {
    /// Reads `.env` first, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://bnevo.db?mode=rwc".to_owned());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_owned())
            .parse()?;
        let assets_dir = env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_owned());
        let workspace_capacity = env::var("WORKSPACE_CAPACITY")
            .unwrap_or_else(|_| "1024".to_owned())
            .parse()?;
        let workspace_idle = env::var("WORKSPACE_IDLE_SECS")
            .unwrap_or_else(|_| "1800".to_owned())
            .parse()
            .map(Duration::from_secs)?;

        Ok(Self {
            database_url,
            bind_addr,
            assets_dir: assets_dir.into(),
            workspace_capacity,
            workspace_idle,
        })
    }
}
