use darkroom_config::{GenerationConfig, OutputModality, PROMPT_PLACEHOLDER};

use crate::types::{GenerationRequest, ReferenceImage};

/// What the generation capability is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Plain text instruction
    Text { text: String },
    /// Instruction text combined with an inline reference image
    Multimodal { text: String, image: ReferenceImage },
}

impl Instruction {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Multimodal { text, .. } => text,
        }
    }

    pub const fn reference_image(&self) -> Option<&ReferenceImage> {
        match self {
            Self::Text { .. } => None,
            Self::Multimodal { image, .. } => Some(image),
        }
    }
}

/// Model settings passed explicitly into every generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Upstream model identifier
    pub model: String,
    /// Output channels the model may respond with
    pub output_modalities: Vec<OutputModality>,
    /// Template for prompt-only requests
    pub text_template: String,
    /// Template for requests carrying a reference image
    pub reference_template: String,
}

impl GenerationSettings {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            output_modalities: config.output_modalities.clone(),
            text_template: config.text_template.clone(),
            reference_template: config.reference_template.clone(),
        }
    }

    /// Turn a validated request into the instruction sent upstream
    pub fn instruction(&self, request: GenerationRequest) -> Instruction {
        match request.reference_image {
            Some(image) => Instruction::Multimodal {
                text: self.reference_template.replace(PROMPT_PLACEHOLDER, &request.prompt),
                image,
            },
            None => Instruction::Text {
                text: self.text_template.replace(PROMPT_PLACEHOLDER, &request.prompt),
            },
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-exp".to_owned(),
            output_modalities: vec![OutputModality::Text, OutputModality::Image],
            text_template: "Generate an image: {prompt}".to_owned(),
            reference_template: "Generate an image based on this reference and description: {prompt}".to_owned(),
        }
    }
}
