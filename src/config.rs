//! Application configuration, read from the environment once at start-up.

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Settings for the hosted completion service.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl AiConfig {
    /// Whether enough configuration is present to call the service.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Process-wide configuration. Built once in [`init`] and handed to the
/// layers that need it, instead of each call site reading the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Address notifications are addressed to (admin inbox / mail dispatch).
    pub notify_recipient: String,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3001);
        let notify_recipient = std::env::var("NOTIFY_RECIPIENT")
            .unwrap_or_else(|_| "team@careercompass.example".to_string());

        let ai = AiConfig {
            api_key: std::env::var("COMPLETION_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            base_url: std::env::var("COMPLETION_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        Self {
            environment,
            host,
            port,
            notify_recipient,
            ai,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Build the global configuration from the environment. Later calls keep the
/// first value.
pub fn init() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

/// The global configuration, initializing it on first use.
pub fn get() -> &'static AppConfig {
    init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_has_sane_defaults() {
        let config = AppConfig::from_env();
        assert!(!config.host.is_empty());
        assert!(config.port > 0);
        assert!(!config.notify_recipient.is_empty());
        assert!(!config.ai.base_url.is_empty());
        assert!(!config.ai.model.is_empty());
    }

    #[test]
    fn test_ai_config_unconfigured_without_key() {
        let ai = AiConfig {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        };
        assert!(!ai.is_configured());
    }
}
