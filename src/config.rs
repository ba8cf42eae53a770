use std::time::Duration;

/// Service-level knobs, read once at startup. The pipeline itself is
/// configured per request through `types::profile::ProfileOptions`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 3000),
            max_file_size: env_or("MAX_FILE_SIZE_MB", 25usize) * 1024 * 1024,
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECONDS", 3600)),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
