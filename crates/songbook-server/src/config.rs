use std::env;

pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Server settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub app_name: String,
    pub environment: String,
    pub log_level: String,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let log_level = lookup("LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_log_level(&environment).to_string());

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .filter(|p| *p != 0)
                .unwrap_or(5001),
            api_prefix: normalize_prefix(lookup("API_PREFIX").as_deref()),
            app_name: lookup("APP_NAME").unwrap_or_else(|| "Songs API".to_string()),
            environment,
            log_level,
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "development" | "testing" => "debug",
        "production" => "warn",
        _ => "info",
    }
}

/// `/api/v1/` and `api/v1` both become `/api/v1`. The prefix cannot be the
/// root, where it would collide with the bare `/songs` routes.
pub fn normalize_prefix(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or(DEFAULT_API_PREFIX).trim().trim_matches('/');
    if trimmed.is_empty() {
        tracing::warn!("API_PREFIX cannot be the root path, using {DEFAULT_API_PREFIX}");
        return DEFAULT_API_PREFIX.to_string();
    }
    format!("/{trimmed}")
}
