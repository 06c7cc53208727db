use serde::Deserialize;

/// Upstream API used when `SATCHEL_BASE_URL` is not set.
pub const DEFAULT_SATCHEL_BASE_URL: &str = "https://api.satchelone.com/api";

/// Upstream request timeout used when `SATCHEL_TIMEOUT_SECS` is not set.
pub const DEFAULT_SATCHEL_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub satchel_base_url: String,
    pub satchel_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            satchel_base_url: parse_base_url(
                std::env::var("SATCHEL_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .as_deref(),
            )?,
            satchel_timeout_secs: std::env::var("SATCHEL_TIMEOUT_SECS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| {
                            anyhow::anyhow!("SATCHEL_TIMEOUT_SECS must be a positive integer")
                        })
                })
                .transpose()?
                .unwrap_or(DEFAULT_SATCHEL_TIMEOUT_SECS),
        };

        // Log successful configuration load
        tracing::debug!("Satchel One Base URL: {}", config.satchel_base_url);
        tracing::debug!("Satchel One timeout: {}s", config.satchel_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Validates the upstream base URL, falling back to the public Satchel One API.
fn parse_base_url(raw: Option<&str>) -> anyhow::Result<String> {
    let url = raw.unwrap_or(DEFAULT_SATCHEL_BASE_URL).trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("SATCHEL_BASE_URL must start with http:// or https://");
    }
    Ok(url.trim_end_matches('/').to_string())
}
