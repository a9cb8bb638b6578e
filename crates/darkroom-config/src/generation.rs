use std::fmt;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Placeholder replaced with the caller's prompt in instruction templates
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Generation endpoint and upstream model configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Route the generation endpoint is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Upstream model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Output channels the upstream model is allowed to produce
    #[serde(default = "default_output_modalities")]
    pub output_modalities: Vec<OutputModality>,
    /// Instruction used when no reference image is attached
    #[serde(default = "default_text_template")]
    pub text_template: String,
    /// Instruction used alongside a reference image
    #[serde(default = "default_reference_template")]
    pub reference_template: String,
    /// Upstream provider connection settings
    pub provider: GenerationProviderConfig,
}

impl GenerationConfig {
    /// Configuration with default model settings for the given provider
    pub fn with_provider(provider: GenerationProviderConfig) -> Self {
        Self {
            path: default_path(),
            model: default_model(),
            output_modalities: default_output_modalities(),
            text_template: default_text_template(),
            reference_template: default_reference_template(),
            provider,
        }
    }
}

/// Connection settings for the upstream generation provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationProviderConfig {
    /// Provider protocol
    #[serde(rename = "type")]
    pub provider_type: GenerationProviderType,
    /// API key sent with every upstream request
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Supported upstream generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationProviderType {
    /// Google Generative Language API (Gemini)
    Google,
}

/// Output channel an upstream model may respond with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputModality {
    Text,
    Image,
}

impl OutputModality {
    /// Wire name used by the upstream API
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
        }
    }
}

impl fmt::Display for OutputModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_path() -> String {
    "/api/generate".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_output_modalities() -> Vec<OutputModality> {
    vec![OutputModality::Text, OutputModality::Image]
}

fn default_text_template() -> String {
    "Generate an image: {prompt}".to_string()
}

fn default_reference_template() -> String {
    "Generate an image based on this reference and description: {prompt}".to_string()
}
