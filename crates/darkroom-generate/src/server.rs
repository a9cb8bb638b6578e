use darkroom_config::{GenerationConfig, GenerationProviderType};

use crate::{
    error::Result,
    instruction::GenerationSettings,
    provider::{GenerationCapability, google::GoogleCapability},
    types::{GeneratePayload, GenerationResult},
};

/// Generation server pairing one capability with its model settings
///
/// Immutable after construction; shared across requests behind an `Arc`.
pub struct Server {
    capability: Box<dyn GenerationCapability>,
    settings: GenerationSettings,
}

impl Server {
    /// Create a server around any capability, e.g. a fake in tests
    pub fn new(capability: Box<dyn GenerationCapability>, settings: GenerationSettings) -> Self {
        Self { capability, settings }
    }

    /// Run one generation through the configured capability
    pub async fn generate(&self, payload: GeneratePayload) -> Result<GenerationResult> {
        crate::proxy::generate(self.capability.as_ref(), &self.settings, payload).await
    }
}

/// Builder for constructing the generation server from configuration
pub struct GenerationServerBuilder<'a> {
    config: &'a GenerationConfig,
}

impl<'a> GenerationServerBuilder<'a> {
    pub const fn new(config: &'a GenerationConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Server {
        let provider = &self.config.provider;

        let capability: Box<dyn GenerationCapability> = match provider.provider_type {
            GenerationProviderType::Google => Box::new(GoogleCapability::new(
                "google".to_owned(),
                provider.api_key.clone(),
                provider.base_url.clone(),
            )),
        };

        let settings = GenerationSettings::from_config(self.config);

        tracing::debug!(
            provider = %capability.name(),
            model = %settings.model,
            "generation server initialized"
        );

        Server::new(capability, settings)
    }
}
