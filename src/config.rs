use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Talent Protocol API key. When unset the service runs in fixture mode
    /// and serves canned data instead of calling upstream.
    pub talent_api_key: Option<String>,
    pub talent_base_url: String,
    pub upstream_timeout_secs: u64,
    pub enrichment_concurrency: usize,
    pub enrichment_fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            talent_api_key: std::env::var("TALENT_PROTOCOL_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            talent_base_url: std::env::var("TALENT_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.talentprotocol.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a number"))?,
            enrichment_concurrency: std::env::var("ENRICHMENT_CONCURRENCY")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ENRICHMENT_CONCURRENCY must be a number"))?,
            enrichment_fetch_timeout_secs: std::env::var("ENRICHMENT_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ENRICHMENT_FETCH_TIMEOUT_SECS must be a number"))?,
        };

        if !config.talent_base_url.starts_with("http://")
            && !config.talent_base_url.starts_with("https://")
        {
            anyhow::bail!("TALENT_API_BASE_URL must start with http:// or https://");
        }
        if config.enrichment_concurrency == 0 {
            anyhow::bail!("ENRICHMENT_CONCURRENCY must be at least 1");
        }
        if config.upstream_timeout_secs == 0 || config.enrichment_fetch_timeout_secs == 0 {
            anyhow::bail!("timeouts must be at least 1 second");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Talent API base URL: {}", config.talent_base_url);
        tracing::debug!("Server port: {}", config.port);
        tracing::debug!(
            "Enrichment fan-out: {} concurrent, {}s per-fetch timeout",
            config.enrichment_concurrency,
            config.enrichment_fetch_timeout_secs
        );
        if let Some(ref key) = config.talent_api_key {
            if let Some(masked) = mask_key(key) {
                tracing::debug!("API key (masked): {}", masked);
            }
        } else {
            tracing::warn!("TALENT_PROTOCOL_API_KEY not set - running in fixture mode");
        }

        Ok(config)
    }
}

/// First and last four characters of the key, elided in between. Counts
/// characters rather than bytes so multibyte keys cannot split a boundary.
/// Keys of eight characters or fewer are never echoed, even masked.
fn mask_key(key: &str) -> Option<String> {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return None;
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    Some(format!("{}...{}", head, tail))
}
