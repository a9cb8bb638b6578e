//! Google Generative Language API (Gemini) generation capability

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CapabilityError, GenerationCapability};
use crate::{
    instruction::{GenerationSettings, Instruction},
    types::Artifact,
};

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` capability
pub(crate) struct GoogleCapability {
    name: String,
    client: Client,
    api_key: SecretString,
    base_url: Url,
}

impl GoogleCapability {
    /// Create a capability for the given key and optional base URL
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(name: String, api_key: SecretString, base_url: Option<Url>) -> Self {
        let base_url = base_url.unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        Self {
            name,
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Build the `generateContent` endpoint URL for a model
    fn generate_url(&self, model: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/models/{model}:generateContent")
    }
}

// -- Request wire types --

/// Gemini `generateContent` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

/// A request part: text or inline image data
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<&'static str>,
}

impl GeminiRequest {
    fn new(instruction: &Instruction, settings: &GenerationSettings) -> Self {
        let mut parts = vec![GeminiPart::Text {
            text: instruction.text().to_owned(),
        }];

        if let Some(image) = instruction.reference_image() {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.media_type.clone(),
                    data: image.to_base64(),
                },
            });
        }

        Self {
            contents: vec![GeminiContent { role: "user", parts }],
            generation_config: GeminiGenerationConfig {
                response_modalities: settings.output_modalities.iter().map(|m| m.as_str()).collect(),
            },
        }
    }
}

// -- Response wire types --

/// Gemini `generateContent` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Collect every inline data part across all candidates, in order
    fn into_artifacts(self) -> Result<Vec<Artifact>, CapabilityError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CapabilityError::Blocked(reason));
        }

        let mut artifacts = Vec::new();

        for candidate in self.candidates {
            if let Some(reason) = &candidate.finish_reason {
                tracing::debug!(finish_reason = %reason, "gemini candidate finished");
            }

            let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
            for part in parts {
                if let Some(text) = part.text {
                    tracing::debug!(len = text.len(), "ignoring text part in gemini response");
                }

                if let Some(inline) = part.inline_data {
                    let bytes = STANDARD
                        .decode(inline.data.as_bytes())
                        .map_err(|e| CapabilityError::MalformedResponse(format!("inline data is not base64: {e}")))?;
                    artifacts.push(Artifact::new(inline.mime_type, bytes));
                }
            }
        }

        Ok(artifacts)
    }
}

#[async_trait]
impl GenerationCapability for GoogleCapability {
    async fn generate(
        &self,
        instruction: &Instruction,
        settings: &GenerationSettings,
    ) -> Result<Vec<Artifact>, CapabilityError> {
        let url = self.generate_url(&settings.model);
        let wire_request = GeminiRequest::new(instruction, settings);

        tracing::debug!(
            provider = %self.name,
            model = %settings.model,
            with_reference = instruction.reference_image().is_some(),
            "sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| CapabilityError::Connection(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::warn!(
                provider = %self.name,
                status = %status,
                "upstream returned error"
            );

            return Err(CapabilityError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let wire_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        let artifacts = wire_response.into_artifacts()?;

        tracing::debug!(
            provider = %self.name,
            artifacts = artifacts.len(),
            "generation request complete"
        );

        Ok(artifacts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
