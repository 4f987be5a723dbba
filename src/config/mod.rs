// src/config/mod.rs
// Environment-driven configuration for the vibe service

use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct VibeConfig {
    // ── Upstream model
    /// Credential for the chat completions API; `None` means mock mode
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub upstream_timeout_secs: u64,

    // ── Rate limiting
    pub rate_limit: u32,
    pub rate_window_secs: u64,
    pub rate_capacity: usize,

    // ── Input bounding
    pub max_input_chars: usize,

    // ── Server
    pub host: String,
    pub port: u16,
}

impl Default for VibeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            upstream_timeout_secs: 60,
            rate_limit: 5,
            rate_window_secs: 60,
            rate_capacity: 500,
            max_input_chars: 2000,
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Read an env var and parse it, ignoring trailing `# comments`.
/// Missing variables silently use the default; unparseable ones warn.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    debug!(key, value = clean_val, "Config value from environment");
                    parsed
                }
                Err(_) => {
                    warn!(key, value = %val, "Config value failed to parse, using default");
                    default
                }
            }
        }
        Err(_) => default,
    }
}

/// Read a credential, treating blank values as absent
fn read_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

fn parse_bool_env(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

/// Credential from `key_var`, unless `disable_var` switches the model off
fn resolve_api_key(disable_var: &str, key_var: &str) -> Option<String> {
    if parse_bool_env(disable_var).unwrap_or(false) {
        info!(disable_var, "LLM disabled, serving mock reports");
        return None;
    }
    read_key(key_var)
}

impl VibeConfig {
    /// Load configuration from the process environment.
    ///
    /// Set `VIBESCORE_DISABLE_LLM=1` to drop the credential and force the mock report.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            openai_api_key: resolve_api_key("VIBESCORE_DISABLE_LLM", "OPENAI_API_KEY"),
            openai_base_url: env_var_or("OPENAI_BASE_URL", defaults.openai_base_url),
            model: env_var_or("VIBESCORE_MODEL", defaults.model),
            temperature: env_var_or("VIBESCORE_TEMPERATURE", defaults.temperature),
            upstream_timeout_secs: env_var_or(
                "VIBESCORE_UPSTREAM_TIMEOUT",
                defaults.upstream_timeout_secs,
            ),
            rate_limit: env_var_or("VIBESCORE_RATE_LIMIT", defaults.rate_limit),
            rate_window_secs: env_var_or("VIBESCORE_RATE_WINDOW", defaults.rate_window_secs),
            rate_capacity: env_var_or("VIBESCORE_RATE_CAPACITY", defaults.rate_capacity),
            max_input_chars: env_var_or("VIBESCORE_MAX_INPUT_CHARS", defaults.max_input_chars),
            host: env_var_or("VIBESCORE_HOST", defaults.host),
            port: env_var_or("VIBESCORE_PORT", defaults.port),
        }
    }

    /// Log the operating mode without exposing the credential
    pub fn log_status(&self) {
        if self.has_llm() {
            debug!(model = %self.model, base_url = %self.openai_base_url, "Upstream model configured");
        } else {
            warn!("No OPENAI_API_KEY configured - every analysis returns the mock report");
        }
    }

    /// Whether live analysis is possible
    pub fn has_llm(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Max tracing level from `VIBESCORE_LOG_LEVEL`. Read before the subscriber
/// exists, so it cannot log; unknown values mean INFO.
pub fn log_level_from_env() -> tracing::Level {
    std::env::var("VIBESCORE_LOG_LEVEL")
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(tracing::Level::INFO)
}

fn parse_level(value: &str) -> Option<tracing::Level> {
    tracing::Level::from_str(value.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = VibeConfig::default();
        assert!(config.openai_api_key.is_none());
        assert!(!config.has_llm());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.rate_limit, 5);
        assert_eq!(config.rate_window(), Duration::from_secs(60));
        assert_eq!(config.rate_capacity, 500);
        assert_eq!(config.max_input_chars, 2000);
    }

    #[test]
    fn test_bind_address() {
        let config = VibeConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..VibeConfig::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" debug "), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("WARN"), Some(tracing::Level::WARN));
        assert_eq!(parse_level("nonsense"), None);
    }

    #[test]
    fn test_env_var_or_missing_uses_default() {
        let value: u32 = env_var_or("VIBESCORE_TEST_SURELY_UNSET_VAR", 42);
        assert_eq!(value, 42);
    }

    // Each test owns uniquely named variables so parallel tests never collide
    fn set(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn unset(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn test_env_var_or_strips_trailing_comment() {
        set("VIBESCORE_TEST_COMMENTED_LIMIT", "12 # burst allowance");
        let value: u32 = env_var_or("VIBESCORE_TEST_COMMENTED_LIMIT", 5);
        unset("VIBESCORE_TEST_COMMENTED_LIMIT");
        assert_eq!(value, 12);
    }

    #[test]
    fn test_env_var_or_unparseable_uses_default() {
        set("VIBESCORE_TEST_BAD_PORT", "not-a-port");
        let value: u16 = env_var_or("VIBESCORE_TEST_BAD_PORT", 3000);
        unset("VIBESCORE_TEST_BAD_PORT");
        assert_eq!(value, 3000);
    }

    #[test]
    fn test_blank_key_means_mock_mode() {
        set("VIBESCORE_TEST_BLANK_KEY", "   ");
        let key = resolve_api_key(
            "VIBESCORE_TEST_BLANK_KEY_DISABLE",
            "VIBESCORE_TEST_BLANK_KEY",
        );
        unset("VIBESCORE_TEST_BLANK_KEY");
        assert!(key.is_none());
    }

    #[test]
    fn test_key_is_read_when_present() {
        set("VIBESCORE_TEST_PRESENT_KEY", "sk-live");
        let key = resolve_api_key(
            "VIBESCORE_TEST_PRESENT_KEY_DISABLE",
            "VIBESCORE_TEST_PRESENT_KEY",
        );
        unset("VIBESCORE_TEST_PRESENT_KEY");
        assert_eq!(key.as_deref(), Some("sk-live"));
    }

    #[test]
    fn test_disable_switch_overrides_key() {
        set("VIBESCORE_TEST_DISABLED_KEY", "sk-live");
        set("VIBESCORE_TEST_DISABLE_SWITCH", "1");
        let key = resolve_api_key(
            "VIBESCORE_TEST_DISABLE_SWITCH",
            "VIBESCORE_TEST_DISABLED_KEY",
        );
        unset("VIBESCORE_TEST_DISABLED_KEY");
        unset("VIBESCORE_TEST_DISABLE_SWITCH");
        assert!(key.is_none());
    }

    #[test]
    fn test_parse_bool_env() {
        let cases = [
            ("1", true),
            ("TRUE", true),
            (" on ", true),
            ("0", false),
            ("nope", false),
        ];
        for (value, expected) in cases {
            set("VIBESCORE_TEST_BOOL", value);
            assert_eq!(
                parse_bool_env("VIBESCORE_TEST_BOOL"),
                Some(expected),
                "value: {:?}",
                value
            );
        }
        unset("VIBESCORE_TEST_BOOL");
        assert_eq!(parse_bool_env("VIBESCORE_TEST_BOOL"), None);
    }

    #[test]
    fn test_has_llm_with_key() {
        let config = VibeConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..VibeConfig::default()
        };
        assert!(config.has_llm());
    }
}
