use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub api_role: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("PREVENTION_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PREVENTION_API_URL not set, using empty value");
                    String::new()
                }),
            api_token: env::var("PREVENTION_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("PREVENTION_API_TOKEN not set, using empty value");
                    String::new()
                }),
            api_role: env::var("PREVENTION_API_ROLE")
                .unwrap_or_else(|_| {
                    warn!("PREVENTION_API_ROLE not set, defaulting to member");
                    "member".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_token.is_empty()
    }
}
