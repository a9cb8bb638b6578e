use crate::{
    error::{GenerateError, Result},
    instruction::GenerationSettings,
    provider::GenerationCapability,
    types::{Artifact, GeneratePayload, GenerationRequest, GenerationResult},
};

/// Generate one image for a caller's payload
///
/// Validates the prompt before anything else, so a bad request never
/// reaches the capability. The first `image/*` artifact is returned
/// untouched; every other failure collapses into
/// [`GenerateError::GenerationFailed`] with the cause logged here.
///
/// # Errors
///
/// Returns [`GenerateError::BadRequest`] for a missing, empty or non-text
/// prompt, and [`GenerateError::GenerationFailed`] when no image comes back.
pub async fn generate(
    capability: &dyn GenerationCapability,
    settings: &GenerationSettings,
    payload: GeneratePayload,
) -> Result<GenerationResult> {
    let request = GenerationRequest::try_from(payload)?;
    let instruction = settings.instruction(request);

    let artifacts = capability
        .generate(&instruction, settings)
        .await
        .map_err(|e| {
            tracing::error!(provider = %capability.name(), model = %settings.model, error = %e, "image generation failed");
            GenerateError::failed()
        })?;

    let total = artifacts.len();
    let image = artifacts.into_iter().find(Artifact::is_image).ok_or_else(|| {
        tracing::warn!(provider = %capability.name(), artifacts = total, "no image artifact in response");
        GenerateError::no_image()
    })?;

    Ok(image.into())
}
