use std::path::Path;

use secrecy::ExposeSecret;

use crate::{Config, OutputModality, PROMPT_PLACEHOLDER};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents fail
    /// to parse or validate
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from raw TOML text
    ///
    /// Expands `{{ env.VAR }}` placeholders, deserializes, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable expansion fails, TOML
    /// parsing fails, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_routes()?;
        self.validate_generation()?;
        Ok(())
    }

    fn validate_routes(&self) -> anyhow::Result<()> {
        if !self.generation.path.starts_with('/') {
            anyhow::bail!("generation.path must start with '/': `{}`", self.generation.path);
        }

        let health = &self.server.health;
        if health.enabled {
            if !health.path.starts_with('/') {
                anyhow::bail!("server.health.path must start with '/': `{}`", health.path);
            }
            if health.path == self.generation.path {
                anyhow::bail!("server.health.path and generation.path must differ");
            }
        }

        if self.server.body_limit == 0 {
            anyhow::bail!("server.body_limit must be greater than 0");
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        let generation = &self.generation;

        if generation.model.trim().is_empty() {
            anyhow::bail!("generation.model must not be empty");
        }

        if !generation.output_modalities.contains(&OutputModality::Image) {
            anyhow::bail!("generation.output_modalities must include IMAGE");
        }

        for (name, template) in [
            ("text_template", &generation.text_template),
            ("reference_template", &generation.reference_template),
        ] {
            if !template.contains(PROMPT_PLACEHOLDER) {
                anyhow::bail!("generation.{name} must contain the {PROMPT_PLACEHOLDER} placeholder");
            }
        }

        if generation.provider.api_key.expose_secret().is_empty() {
            anyhow::bail!("generation.provider.api_key must not be empty");
        }

        Ok(())
    }
}
