use base64::{
    Engine,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::GenerateError;

/// Standard alphabet that accepts input with or without `=` padding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Media type assumed for reference images we cannot identify
const FALLBACK_IMAGE_TYPE: &str = "image/png";

/// Raw fields of a generation request body, before validation
///
/// Kept as loose JSON values so that a wrong-typed `prompt` is reported
/// as a bad request rather than a body rejection.
#[derive(Debug, Default, Clone)]
pub struct GeneratePayload {
    pub prompt: Option<Value>,
    pub image: Option<Value>,
}

impl GeneratePayload {
    /// Read the payload from a request body
    ///
    /// Any JSON value other than an object yields an empty payload, which
    /// validation then rejects for its missing prompt.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::GenerationFailed`] when the body is not JSON
    /// or is `null`.
    pub fn from_json(body: &[u8]) -> Result<Self, GenerateError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(mut fields)) => Ok(Self {
                prompt: fields.remove("prompt"),
                image: fields.remove("image"),
            }),
            Ok(Value::Null) => {
                tracing::warn!("request body is null");
                Err(GenerateError::failed())
            }
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                tracing::warn!(error = %e, "request body is not valid JSON");
                Err(GenerateError::failed())
            }
        }
    }

    /// Payload with a text prompt and no image
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(Value::String(prompt.into())),
            image: None,
        }
    }

    /// Attach a base64 reference image
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(Value::String(image.into()));
        self
    }
}

/// A validated generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference_image: Option<ReferenceImage>,
}

impl TryFrom<GeneratePayload> for GenerationRequest {
    type Error = GenerateError;

    fn try_from(payload: GeneratePayload) -> Result<Self, Self::Error> {
        let prompt = match payload.prompt {
            Some(Value::String(prompt)) if !prompt.is_empty() => prompt,
            _ => return Err(GenerateError::BadRequest),
        };

        // Anything other than a non-empty string means "no image attached"
        let reference_image = match payload.image {
            Some(Value::String(image)) if !image.is_empty() => {
                let image = ReferenceImage::from_base64(&image).map_err(|e| {
                    tracing::warn!(error = %e, "reference image is not valid base64");
                    GenerateError::failed()
                })?;
                Some(image)
            }
            _ => None,
        };

        Ok(Self {
            prompt,
            reference_image,
        })
    }
}

/// Image supplied by the caller to condition the generated output
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ReferenceImage {
    /// Decode a base64 image, with or without a `data:<type>;base64,` prefix
    ///
    /// The media type comes from the data URL when present, otherwise it is
    /// sniffed from the decoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64
    pub fn from_base64(input: &str) -> Result<Self, base64::DecodeError> {
        let (declared, encoded) = split_data_url(input);
        let bytes = LENIENT.decode(encoded.trim())?;

        let media_type = declared.unwrap_or_else(|| sniff_media_type(&bytes)).to_owned();

        Ok(Self { bytes, media_type })
    }

    /// Re-encode the image bytes as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Split `data:image/jpeg;base64,AAAA` into its media type and payload
fn split_data_url(input: &str) -> (Option<&str>, &str) {
    let Some(rest) = input.strip_prefix("data:") else {
        return (None, input);
    };

    match rest.split_once(',') {
        Some((meta, data)) => {
            let media_type = meta.strip_suffix(";base64").unwrap_or(meta);
            let media_type = (!media_type.is_empty()).then_some(media_type);
            (media_type, data)
        }
        None => (None, input),
    }
}

/// Identify common image formats from their magic bytes
fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => FALLBACK_IMAGE_TYPE,
    }
}

/// One output item returned by a generation capability
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether the artifact belongs to the `image/` media type family
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The single image handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image_bytes: Vec<u8>,
    pub media_type: String,
}

impl From<Artifact> for GenerationResult {
    fn from(artifact: Artifact) -> Self {
        Self {
            image_bytes: artifact.bytes,
            media_type: artifact.media_type,
        }
    }
}

/// Success body: `{ "image": "<base64>", "mimeType": "image/png" }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image: String,
    pub mime_type: String,
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            image: STANDARD.encode(&result.image_bytes),
            mime_type: result.media_type,
        }
    }
}
