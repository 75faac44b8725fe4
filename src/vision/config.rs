//! Vision configuration, read from the environment or built explicitly.

use std::fmt;
use std::time::Duration;

/// Provider used when neither the caller nor the environment names one.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Environment switch; the literal `false` turns vision analysis off.
pub const ENABLED_VAR: &str = "VISION_ENABLED";
/// Environment default for the provider name.
pub const PROVIDER_VAR: &str = "VISION_PROVIDER";
/// Environment override for the model name.
pub const MODEL_VAR: &str = "VISION_MODEL";

/// Settings for the vision analysis step of image conversion.
#[derive(Clone)]
pub struct VisionConfig {
    /// Whether to call a provider at all
    pub enabled: bool,

    /// Provider name (`openai`, `anthropic`, `gemini`)
    pub provider: String,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// API key override; otherwise read from the provider's variable
    pub api_key: Option<String>,

    /// Request timeout for the provider call
    pub timeout: Duration,
}

impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: DEFAULT_PROVIDER.to_string(),
            model: None,
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl VisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `VISION_ENABLED`, `VISION_PROVIDER` and `VISION_MODEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(ENABLED_VAR)
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let provider = lookup(PROVIDER_VAR)
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let model = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty());

        Self {
            enabled,
            provider,
            model,
            ..Self::default()
        }
    }

    /// A configuration that never calls a provider.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Select a provider explicitly; this wins over the environment.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into().to_lowercase();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = VisionConfig::from_lookup(lookup(&[]));
        assert!(config.enabled);
        assert_eq!(config.provider, "openai");
        assert!(config.model.is_none());
    }

    #[test]
    fn test_env_disables_and_selects() {
        let config = VisionConfig::from_lookup(lookup(&[
            ("VISION_ENABLED", "FALSE"),
            ("VISION_PROVIDER", "Gemini"),
        ]));
        assert!(!config.enabled);
        assert_eq!(config.provider, "gemini");
    }

    #[test]
    fn test_only_false_disables() {
        let config = VisionConfig::from_lookup(lookup(&[("VISION_ENABLED", "0")]));
        assert!(config.enabled);
    }

    #[test]
    fn test_explicit_provider_wins() {
        let config = VisionConfig::from_lookup(lookup(&[("VISION_PROVIDER", "gemini")]))
            .with_provider("Anthropic");
        assert_eq!(config.provider, "anthropic");
    }
}
