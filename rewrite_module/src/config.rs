use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-sonnet-4";
pub const DEFAULT_TRIGGER_KEYWORD: &str = "ty";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {key}")]
    MissingEnv { key: &'static str },
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide configuration, loaded once at startup and passed explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub notion_api_key: String,
    /// Internal Notion webhooks may not use signing secrets; absent secret
    /// means signature verification is skipped.
    pub notion_webhook_secret: Option<String>,
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    /// Stored case-folded; matched as a whole word, case-insensitive.
    pub trigger_keyword: String,
}

impl AppConfig {
    /// Build the configuration from the environment. The caller is expected
    /// to have loaded any `.env` file already (`dotenvy::dotenv().ok()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::Invalid {
                        key: "PORT",
                        value: value.trim().to_string(),
                    })?
            }
            _ => DEFAULT_PORT,
        };

        let notion_webhook_secret = env::var("NOTION_WEBHOOK_SECRET")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let openrouter_model = env::var("OPENROUTER_MODEL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string());

        let trigger_keyword = env::var("TRIGGER_KEYWORD")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER_KEYWORD.to_string())
            .to_lowercase();

        Ok(Self {
            port,
            notion_api_key: required("NOTION_API_KEY")?,
            notion_webhook_secret,
            openrouter_api_key: required("OPENROUTER_API_KEY")?,
            openrouter_model,
            trigger_keyword,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnv { key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "PORT",
        "NOTION_API_KEY",
        "NOTION_WEBHOOK_SECRET",
        "OPENROUTER_API_KEY",
        "OPENROUTER_MODEL",
        "TRIGGER_KEYWORD",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_optional_vars_are_unset() {
        clear_env();
        env::set_var("NOTION_API_KEY", "secret_n");
        env::set_var("OPENROUTER_API_KEY", "secret_o");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.openrouter_model, DEFAULT_OPENROUTER_MODEL);
        assert_eq!(config.trigger_keyword, DEFAULT_TRIGGER_KEYWORD);
        assert!(config.notion_webhook_secret.is_none());
    }

    #[test]
    #[serial]
    fn missing_required_credential_is_fatal() {
        clear_env();
        env::set_var("OPENROUTER_API_KEY", "secret_o");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnv {
                key: "NOTION_API_KEY"
            }
        ));
    }

    #[test]
    #[serial]
    fn non_numeric_port_is_fatal() {
        clear_env();
        env::set_var("NOTION_API_KEY", "secret_n");
        env::set_var("OPENROUTER_API_KEY", "secret_o");
        env::set_var("PORT", "not-a-port");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    #[serial]
    fn trigger_keyword_is_case_folded() {
        clear_env();
        env::set_var("NOTION_API_KEY", "secret_n");
        env::set_var("OPENROUTER_API_KEY", "secret_o");
        env::set_var("TRIGGER_KEYWORD", "ReWrite");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.trigger_keyword, "rewrite");
    }
}
