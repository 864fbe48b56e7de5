use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub matchmaking: MatchmakingConfig,
    pub opponent: OpponentConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchmakingConfig {
    pub queue_capacity: usize,
    pub pair_poll_ms: u64,
    pub connection_poll_ms: u64,
    pub connection_timeout_ms: u64,
    pub cleanup_interval_ms: u64,
    pub queue_timeout_ms: u64,
}

impl MatchmakingConfig {
    pub fn pair_poll(&self) -> Duration {
        Duration::from_millis(self.pair_poll_ms)
    }

    pub fn connection_poll(&self) -> Duration {
        Duration::from_millis(self.connection_poll_ms)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpponentConfig {
    pub queue_capacity: usize,
    pub think_delay_ms: u64,
}

impl OpponentConfig {
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub sliding_ttl_secs: u64,
}

impl CacheConfig {
    pub fn sliding_ttl(&self) -> Duration {
        Duration::from_secs(self.sliding_ttl_secs)
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let config_path = "Config.toml";
        let mut config = if Path::new(config_path).exists() {
            match fs::read_to_string(config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        warn!(%err, "failed to parse Config.toml, using defaults");
                        Self::default()
                    }
                },
                Err(err) => {
                    warn!(%err, "failed to read Config.toml, using defaults");
                    Self::default()
                }
            }
        } else {
            info!("Config.toml not found, using defaults");
            Self::default()
        };

        config.merge_env();

        info!(
            queue_capacity = config.matchmaking.queue_capacity,
            queue_timeout_ms = config.matchmaking.queue_timeout_ms,
            connection_timeout_ms = config.matchmaking.connection_timeout_ms,
            think_delay_ms = config.opponent.think_delay_ms,
            cache_ttl_secs = config.cache.sliding_ttl_secs,
            "configuration loaded"
        );

        config
    }

    fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SENET_QUEUE_CAPACITY") {
            if let Ok(parsed) = val.parse() {
                self.matchmaking.queue_capacity = parsed;
                self.opponent.queue_capacity = parsed;
            }
        }
        if let Ok(val) = std::env::var("SENET_QUEUE_TIMEOUT_MS") {
            if let Ok(parsed) = val.parse() {
                self.matchmaking.queue_timeout_ms = parsed;
            }
        }
        if let Ok(val) = std::env::var("SENET_CLEANUP_INTERVAL_MS") {
            if let Ok(parsed) = val.parse() {
                self.matchmaking.cleanup_interval_ms = parsed;
            }
        }
        if let Ok(val) = std::env::var("SENET_CONNECTION_TIMEOUT_MS") {
            if let Ok(parsed) = val.parse() {
                self.matchmaking.connection_timeout_ms = parsed;
            }
        }
        if let Ok(val) = std::env::var("SENET_THINK_DELAY_MS") {
            if let Ok(parsed) = val.parse() {
                self.opponent.think_delay_ms = parsed;
            }
        }
        if let Ok(val) = std::env::var("SENET_CACHE_TTL_SECS") {
            if let Ok(parsed) = val.parse() {
                self.cache.sliding_ttl_secs = parsed;
            }
        }
    }
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            pair_poll_ms: 100,
            connection_poll_ms: 200,
            connection_timeout_ms: 10_000,
            cleanup_interval_ms: 5_000,
            queue_timeout_ms: 30_000,
        }
    }
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            think_delay_ms: 1_000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sliding_ttl_secs: 3 * 60 * 60,
        }
    }
}
