#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod instruction;
mod provider;
mod proxy;
mod server;
mod types;

use std::sync::Arc;

use axum::{Json, Router, body::Bytes, extract::State, routing::post};

pub use error::{FailureReason, GenerateError, Result};
pub use instruction::{GenerationSettings, Instruction};
pub use provider::{CapabilityError, GenerationCapability};
pub use proxy::generate;
pub use server::{GenerationServerBuilder, Server};
pub use types::{
    Artifact, GeneratePayload, GenerateResponse, GenerationRequest, GenerationResult, ReferenceImage,
};

/// Build the generation server from configuration
pub fn build_server(config: &darkroom_config::Config) -> Arc<Server> {
    Arc::new(GenerationServerBuilder::new(&config.generation).build())
}

/// Create the endpoint router for image generation, mounted at `path`
pub fn endpoint_router(path: &str) -> Router<Arc<Server>> {
    Router::new().route(path, post(generate_handler))
}

/// Handle generation requests
///
/// Takes the raw body so that unreadable or mistyped JSON is reported in
/// the usual error shape instead of axum's rejection.
async fn generate_handler(State(server): State<Arc<Server>>, body: Bytes) -> Result<Json<GenerateResponse>> {
    tracing::debug!(body_len = body.len(), "generation handler called");

    let payload = GeneratePayload::from_json(&body)?;
    let result = server.generate(payload).await?;

    tracing::debug!(media_type = %result.media_type, bytes = result.image_bytes.len(), "generation complete");

    Ok(Json(result.into()))
}
