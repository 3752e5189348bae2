use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://translate.yandex.net/api/v1.5/tr.json";
pub const DEFAULT_API_KEY_FILE: &str = "yandex/api_key.txt";

#[derive(Debug, Clone)]
pub struct Config {
    // Yandex Translate
    pub yandex_api_key: String,
    pub yandex_api_url: String,
    pub http_timeout_secs: u64,

    // Recent translations
    pub recent_capacity: usize,

    // Chains
    pub hop_timeout_secs: u64,
    pub max_hops: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Key from the environment, falling back to a key file
            yandex_api_key: match std::env::var("YANDEX_API_KEY") {
                Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
                _ => read_api_key_file(
                    &std::env::var("YANDEX_API_KEY_FILE")
                        .unwrap_or_else(|_| DEFAULT_API_KEY_FILE.to_string()),
                )?,
            },
            yandex_api_url: std::env::var("YANDEX_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(15),

            recent_capacity: std::env::var("RECENT_TRANSLATIONS_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32),

            hop_timeout_secs: std::env::var("HOP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_hops: std::env::var("MAX_HOPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        })
    }

    /// Deadline for a single HTTP request to the Yandex API.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Per-hop provider timeout; `None` when disabled with 0.
    pub fn hop_timeout(&self) -> Option<Duration> {
        (self.hop_timeout_secs > 0).then(|| Duration::from_secs(self.hop_timeout_secs))
    }
}

fn read_api_key_file(path: &str) -> Result<String> {
    let key = std::fs::read_to_string(path).with_context(|| {
        format!(
            "YANDEX_API_KEY not set and key file {} could not be read",
            path
        )
    })?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Yandex API key file {} is empty", path);
    }
    Ok(key.to_string())
}
