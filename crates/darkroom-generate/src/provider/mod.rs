pub(crate) mod google;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    instruction::{GenerationSettings, Instruction},
    types::Artifact,
};

/// An external capability that turns an instruction into media artifacts
///
/// Implementations make exactly one upstream call per invocation and keep
/// no per-request state, so one instance serves concurrent requests.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Run the instruction and return every artifact produced, in order
    async fn generate(
        &self,
        instruction: &Instruction,
        settings: &GenerationSettings,
    ) -> Result<Vec<Artifact>, CapabilityError>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Failure inside a generation capability
///
/// Used for logging only; callers see a single generic failure.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The upstream could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// The upstream answered with an error status
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The upstream refused the prompt
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// The upstream answered with something we could not read
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
