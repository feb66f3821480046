//! Common configuration shared by every service binary.
//!
//! Values come from an optional `config` file in the working directory,
//! overridden by `APP__`-prefixed environment variables (`APP__PORT=0`
//! gives tests a random port). Service-specific settings live in each
//! service's own config module and flatten this struct in.

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Port the HTTP listener binds; 0 picks a free one.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
