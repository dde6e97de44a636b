use std::{env, net::{SocketAddr, ToSocketAddrs as _}};

use sea_orm::ConnectOptions;
use thiserror::Error;
use tracing::info;

const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1:0";

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    pub jwt_key: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment `{0}` is required to be set")]
    Missing(&'static str),
    #[error("`HOST_ADDRESS` is not in a valid format: {0}")]
    InvalidHost(#[source] std::io::Error),
    #[error("unable to resolve host from `HOST_ADDRESS`")]
    UnresolvedHost,
}

pub fn load() -> Result<Config, ConfigError> {
    Ok(Config {
        host_address: load_host_address()?,
        database_opt: load_database_opt()?,
        jwt_key: required("JWT_SECRET")?,
    })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    info!("Loading environment `{name}`");

    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn load_host_address() -> Result<SocketAddr, ConfigError> {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| DEFAULT_HOST_ADDRESS.to_string());

    var.to_socket_addrs()
        .map_err(ConfigError::InvalidHost)?
        .next()
        .ok_or(ConfigError::UnresolvedHost)
}

fn load_database_opt() -> Result<ConnectOptions, ConfigError> {
    let mut opt = ConnectOptions::new(required("DATABASE_URL")?);
    opt.sqlx_logging(false);

    Ok(opt)
}
