//! Pluggable vision analysis.
//!
//! A [`VisionProvider`] turns image bytes into an [`ImageAnalysis`] by sending
//! the shared [`ANALYSIS_PROMPT`] to one vision model. Providers are chosen
//! by name through [`create_provider`]. Every way the step can fail
//! (disabled, not compiled in, no credential, request error, unparseable
//! reply) ends up as [`VisionAnalysis::Failure`] and is never raised to the
//! extractor.

mod analysis;
mod config;
mod prompt;

#[cfg(feature = "vision")]
mod anthropic;
#[cfg(feature = "vision")]
mod gemini;
#[cfg(feature = "vision")]
mod http;
#[cfg(feature = "vision")]
mod openai;

pub use analysis::{
    ColorAnalysis, DetectedObject, DominantColor, ImageAnalysis, Position, Size, StyleAnalysis,
};
pub use config::{VisionConfig, DEFAULT_PROVIDER, ENABLED_VAR, MODEL_VAR, PROVIDER_VAR};
pub use prompt::ANALYSIS_PROMPT;

#[cfg(feature = "vision")]
pub use anthropic::AnthropicProvider;
#[cfg(feature = "vision")]
pub use gemini::GeminiProvider;
#[cfg(feature = "vision")]
pub use openai::OpenAiProvider;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Reasons a vision analysis did not produce a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisionError {
    #[error("Vision analysis disabled via VISION_ENABLED=false")]
    Disabled,

    #[error("Unknown vision provider: {0}. Available providers: openai, anthropic, gemini")]
    UnknownProvider(String),

    #[error("No vision provider available. Set {var} to use the {provider} provider.")]
    MissingCredential { provider: String, var: String },

    #[error("Vision provider unavailable: {0}")]
    Unavailable(String),

    #[error("Vision request failed: {0}")]
    Request(String),

    #[error("Could not parse vision response: {0}")]
    MalformedResponse(String),
}

/// Outcome of one vision analysis: a result or a typed failure, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum VisionAnalysis {
    Success {
        provider: String,
        model: String,
        analysis: ImageAnalysis,
    },
    Failure {
        provider: Option<String>,
        model: Option<String>,
        error: String,
    },
}

impl VisionAnalysis {
    pub fn is_success(&self) -> bool {
        matches!(self, VisionAnalysis::Success { .. })
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            VisionAnalysis::Success { provider, .. } => Some(provider),
            VisionAnalysis::Failure { provider, .. } => provider.as_deref(),
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            VisionAnalysis::Success { model, .. } => Some(model),
            VisionAnalysis::Failure { model, .. } => model.as_deref(),
        }
    }

    pub fn analysis(&self) -> Option<&ImageAnalysis> {
        match self {
            VisionAnalysis::Success { analysis, .. } => Some(analysis),
            VisionAnalysis::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            VisionAnalysis::Success { .. } => None,
            VisionAnalysis::Failure { error, .. } => Some(error),
        }
    }
}

impl Serialize for VisionAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            provider: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            analysis: Option<&'a ImageAnalysis>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Wire {
            success: self.is_success(),
            provider: self.provider(),
            model: self.model(),
            analysis: self.analysis(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// A vision model that can describe an image.
pub trait VisionProvider: Send + Sync {
    /// Provider name, e.g. `openai`.
    fn name(&self) -> &str;

    /// Model the provider calls.
    fn model(&self) -> &str;

    /// Send `prompt` and the image in one request and return the reply text.
    fn complete(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String, VisionError>;

    /// Analyze an image with the shared prompt.
    fn analyze(&self, image: &[u8], mime_type: &str) -> VisionAnalysis {
        let outcome = self
            .complete(ANALYSIS_PROMPT, image, mime_type)
            .and_then(|reply| parse_analysis(&reply));
        match outcome {
            Ok(analysis) => VisionAnalysis::Success {
                provider: self.name().to_string(),
                model: self.model().to_string(),
                analysis,
            },
            Err(err) => {
                log::warn!("{} vision analysis failed: {}", self.name(), err);
                VisionAnalysis::Failure {
                    provider: Some(self.name().to_string()),
                    model: Some(self.model().to_string()),
                    error: err.to_string(),
                }
            }
        }
    }
}

/// The vision backends this crate knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Environment variable holding the API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GOOGLE_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::Gemini => "gemini-1.5-pro",
        }
    }
}

/// Build the configured provider, reading its key from the environment.
pub fn create_provider(config: &VisionConfig) -> Result<Box<dyn VisionProvider>, VisionError> {
    create_provider_with(config, |var| std::env::var(var).ok())
}

/// Build the configured provider with a custom credential lookup.
pub fn create_provider_with<F>(
    config: &VisionConfig,
    lookup: F,
) -> Result<Box<dyn VisionProvider>, VisionError>
where
    F: Fn(&str) -> Option<String>,
{
    if !config.enabled {
        return Err(VisionError::Disabled);
    }
    let kind = ProviderKind::from_name(&config.provider)
        .ok_or_else(|| VisionError::UnknownProvider(config.provider.clone()))?;
    let api_key = config
        .api_key
        .clone()
        .or_else(|| lookup(kind.credential_var()))
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| VisionError::MissingCredential {
            provider: kind.name().to_string(),
            var: kind.credential_var().to_string(),
        })?;
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| kind.default_model().to_string());

    build_provider(kind, api_key, model, config)
}

#[cfg(feature = "vision")]
fn build_provider(
    kind: ProviderKind,
    api_key: String,
    model: String,
    config: &VisionConfig,
) -> Result<Box<dyn VisionProvider>, VisionError> {
    let client = http::client(config.timeout)?;
    let provider: Box<dyn VisionProvider> = match kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(client, api_key, model)),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(client, api_key, model)),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(client, api_key, model)),
    };
    Ok(provider)
}

#[cfg(not(feature = "vision"))]
fn build_provider(
    _kind: ProviderKind,
    _api_key: String,
    _model: String,
    _config: &VisionConfig,
) -> Result<Box<dyn VisionProvider>, VisionError> {
    Err(VisionError::Unavailable(
        "vision support not compiled in".to_string(),
    ))
}

/// Run the configured provider on an image; failures come back typed.
pub fn analyze_image(config: &VisionConfig, image: &[u8], mime_type: &str) -> VisionAnalysis {
    match create_provider(config) {
        Ok(provider) => {
            log::debug!("Analyzing image with {} ({})", provider.name(), provider.model());
            provider.analyze(image, mime_type)
        }
        Err(err) => failure_for(config, err),
    }
}

/// Typed failure for a provider that could not be built.
pub fn failure_for(config: &VisionConfig, err: VisionError) -> VisionAnalysis {
    log::warn!("Vision analysis skipped: {}", err);
    let kind = match err {
        VisionError::Disabled | VisionError::UnknownProvider(_) => None,
        _ => ProviderKind::from_name(&config.provider),
    };
    VisionAnalysis::Failure {
        provider: kind.map(|k| k.name().to_string()),
        model: kind.map(|k| {
            config
                .model
                .clone()
                .unwrap_or_else(|| k.default_model().to_string())
        }),
        error: err.to_string(),
    }
}

/// Providers whose credential is present in the environment.
pub fn available_providers() -> Vec<ProviderKind> {
    ProviderKind::ALL
        .into_iter()
        .filter(|kind| {
            std::env::var(kind.credential_var())
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        })
        .collect()
}

/// Remove a Markdown code fence wrapped around a model reply.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a model reply into an analysis.
pub fn parse_analysis(reply: &str) -> Result<ImageAnalysis, VisionError> {
    serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| VisionError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedProvider {
        reply: Result<String, VisionError>,
    }

    impl VisionProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }

        fn complete(&self, prompt: &str, image: &[u8], _mime: &str) -> Result<String, VisionError> {
            assert_eq!(prompt, ANALYSIS_PROMPT);
            assert!(!image.is_empty());
            self.reply.clone()
        }
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }

    #[test]
    fn test_analyze_success() {
        let provider = CannedProvider {
            reply: Ok("```json\n{\"summary\": \"A cat\"}\n```".to_string()),
        };
        let result = provider.analyze(b"img", "image/png");
        assert!(result.is_success());
        assert_eq!(result.provider(), Some("canned"));
        assert_eq!(
            result.analysis().and_then(|a| a.summary.as_deref()),
            Some("A cat")
        );
    }

    #[test]
    fn test_analyze_malformed_reply_is_typed_failure() {
        let provider = CannedProvider {
            reply: Ok("I cannot see the image.".to_string()),
        };
        let result = provider.analyze(b"img", "image/png");
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("parse"));
        assert!(result.analysis().is_none());
    }

    #[test]
    fn test_analyze_request_failure() {
        let provider = CannedProvider {
            reply: Err(VisionError::Request("HTTP 500".to_string())),
        };
        let result = provider.analyze(b"img", "image/png");
        assert_eq!(result.error(), Some("Vision request failed: HTTP 500"));
        assert_eq!(result.model(), Some("canned-1"));
    }

    #[test]
    fn test_disabled_config() {
        let config = VisionConfig::disabled();
        let err = create_provider_with(&config, |_| Some("key".to_string())).err();
        assert_eq!(err, Some(VisionError::Disabled));

        let result = analyze_image(&config, b"img", "image/png");
        assert!(result.error().unwrap().contains("disabled"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": "Vision analysis disabled via VISION_ENABLED=false"})
        );
    }

    #[test]
    fn test_missing_credential() {
        let config = VisionConfig::new().with_provider("anthropic");
        let err = create_provider_with(&config, |_| None).err().unwrap();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let failure = failure_for(&config, err);
        assert_eq!(failure.provider(), Some("anthropic"));
        assert_eq!(failure.model(), Some("claude-3-5-sonnet-20241022"));
    }

    #[test]
    fn test_unknown_provider() {
        let config = VisionConfig::new().with_provider("clippy");
        let err = create_provider_with(&config, |_| Some("k".to_string())).err();
        assert_eq!(err, Some(VisionError::UnknownProvider("clippy".to_string())));
    }

    #[test]
    fn test_provider_kind_names() {
        assert_eq!(ProviderKind::from_name("Claude"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::from_name("google"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::OpenAi.credential_var(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_success_serialization() {
        let result = VisionAnalysis::Success {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            analysis: ImageAnalysis::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["provider"], "openai");
        assert!(json.get("error").is_none());
        assert!(json.get("analysis").is_some());
    }
}
