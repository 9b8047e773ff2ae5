use std::time::Duration;

/// Runtime configuration, read from the environment with baked-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("FX_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_owned());
        let database_url = std::env::var("FX_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://fxrates.db?mode=rwc".to_owned());
        let cache_ttl_secs = std::env::var("FX_CACHE_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(300);

        Self {
            listen_addr,
            database_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        }
    }
}
