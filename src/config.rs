use std::{collections::HashSet, env, net::SocketAddr, path::PathBuf, time::Duration};

use regex::{Regex, RegexSet};
use thiserror::Error;

use crate::directives::Directive;

pub const DEFAULT_INTERVAL_SECS: f64 = 60.0;
pub const DEFAULT_CONFIG_PATH: &str = "/etc/systemd-health-sampler.toml";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub services: Vec<String>,
    pub interval: Duration,
    pub verbose: bool,
    pub scan_need_reload: bool,
    pub need_reload_ignore: HashSet<String>,
    pub state_ignore: RegexSet,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub config_path: PathBuf,
    pub bind_addr: String,
    pub bind_port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("config key {0} requires a value")]
    MissingValue(String),
    #[error("Interval must be a positive number of seconds, got {0:?}")]
    InvalidInterval(String),
    #[error("invalid StateIgnoreRegex {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
            verbose: false,
            scan_need_reload: false,
            need_reload_ignore: HashSet::new(),
            state_ignore: RegexSet::empty(),
        }
    }
}

impl EngineConfig {
    pub fn from_directives(directives: &[Directive]) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut patterns = Vec::new();

        for directive in directives {
            let first = directive
                .values
                .first()
                .ok_or_else(|| ConfigError::MissingValue(directive.key.clone()))?;

            match directive.key.as_str() {
                "Service" => config.services.extend(directive.values.iter().cloned()),
                "Interval" => config.interval = parse_interval(first)?,
                "Verbose" => config.verbose = is_true(first),
                "ScanNeedReload" => config.scan_need_reload = is_true(first),
                "NeedReloadIgnore" => config
                    .need_reload_ignore
                    .extend(directive.values.iter().cloned()),
                "StateIgnoreRegex" => {
                    for pattern in &directive.values {
                        Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern {
                            pattern: pattern.clone(),
                            reason: err.to_string(),
                        })?;
                        patterns.push(pattern.clone());
                    }
                }
                other => return Err(ConfigError::UnknownKey(other.to_string())),
            }
        }

        config.state_ignore =
            RegexSet::new(&patterns).map_err(|err| ConfigError::InvalidPattern {
                pattern: patterns.join("|"),
                reason: err.to_string(),
            })?;

        Ok(config)
    }

    pub fn is_active(&self) -> bool {
        !self.services.is_empty()
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .filter(|interval| !interval.is_zero())
        .ok_or_else(|| ConfigError::InvalidInterval(raw.to_string()))
}

fn is_true(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_path = env::var("SAMPLER_CONFIG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into();
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(9558);

        let config = Self {
            config_path,
            bind_addr,
            bind_port,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
