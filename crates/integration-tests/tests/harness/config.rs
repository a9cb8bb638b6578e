//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use darkroom_config::{
    Config, CorsConfig, GenerationConfig, GenerationProviderConfig, GenerationProviderType, HealthConfig,
    ServerConfig, TelemetryConfig,
};
use secrecy::SecretString;

/// API key the builder configures and the mock expects
pub const TEST_API_KEY: &str = "test-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    ///
    /// The provider points at the public API until
    /// [`with_google_provider`](Self::with_google_provider) redirects it.
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                generation: GenerationConfig::with_provider(GenerationProviderConfig {
                    provider_type: GenerationProviderType::Google,
                    api_key: SecretString::from(TEST_API_KEY),
                    base_url: None,
                }),
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Point the Google provider at a mock backend
    pub fn with_google_provider(mut self, base_url: &str) -> Self {
        self.config.generation.provider.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Mount the generation endpoint on another path
    pub fn with_generation_path(mut self, path: &str) -> Self {
        path.clone_into(&mut self.config.generation.path);
        self
    }

    /// Use another upstream model
    pub fn with_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.generation.model);
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Set the maximum request body size
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.config.server.body_limit = limit;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
