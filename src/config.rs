//! Server configuration read from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::filter::TOP_ROWS;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATASET_PATH: &str = "dataset.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetChoice {
    Demo { reason: &'static str },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub dataset: DatasetChoice,
    pub top_n: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            dataset: DatasetChoice::File(PathBuf::from(DEFAULT_DATASET_PATH)),
            top_n: TOP_ROWS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid SALESDASH_ADDR {0:?}: expected host:port")]
    InvalidBindAddr(String),
    #[error("invalid SALESDASH_TOP_N {0:?}: expected a positive integer")]
    InvalidTopN(String),
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_empty_var("SALESDASH_ADDR") {
            config.bind_addr = raw
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(raw.clone()))?;
        }

        if let Some(raw) = non_empty_var("SALESDASH_TOP_N") {
            config.top_n = match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(ConfigError::InvalidTopN(raw)),
            };
        }

        let force_demo = non_empty_var("SALESDASH_USE_DEMO")
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(false);
        config.dataset = if force_demo {
            DatasetChoice::Demo {
                reason: "SALESDASH_USE_DEMO",
            }
        } else if let Some(path) = non_empty_var("SALESDASH_DATASET") {
            DatasetChoice::File(PathBuf::from(path))
        } else {
            DatasetChoice::File(PathBuf::from(DEFAULT_DATASET_PATH))
        };

        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
