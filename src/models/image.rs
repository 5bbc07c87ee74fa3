use serde::{Deserialize, Serialize};

use crate::{
    error::{ForgeError, Result},
    models::{AspectRatio, OutputFormat},
};

/// Generation knobs collected from the caller. Each back-end honors the
/// subset of fields it understands and drops the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
    pub num_outputs: u32,
    pub guidance_scale: f32,
    pub inference_steps: u32,
    pub aspect_ratio: AspectRatio,
    pub output_format: OutputFormat,
    pub output_quality: u32,
    pub disable_safety_checker: bool,
    pub seed: Option<u64>,
}

impl Default for ImageParams {
    fn default() -> Self {
        ImageParams {
            width: 1024,
            height: 1024,
            num_outputs: 1,
            guidance_scale: 3.5,
            inference_steps: 28,
            aspect_ratio: AspectRatio::Square,
            output_format: OutputFormat::Webp,
            output_quality: 80,
            disable_safety_checker: true,
            seed: None,
        }
    }
}

impl ImageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_num_outputs(mut self, num_outputs: u32) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_inference_steps(mut self, inference_steps: u32) -> Self {
        self.inference_steps = inference_steps;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_output_quality(mut self, output_quality: u32) -> Self {
        self.output_quality = output_quality;
        self
    }

    pub fn with_safety_checker(mut self, enabled: bool) -> Self {
        self.disable_safety_checker = !enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed as it should reach a back-end: 0 means "unset", so the
    /// back-end picks randomly.
    pub fn effective_seed(&self) -> Option<u64> {
        match self.seed {
            Some(0) | None => None,
            Some(seed) => Some(seed),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.num_outputs) {
            return Err(ForgeError::ConfigError(format!(
                "num_outputs must be between 1 and 10, got {}",
                self.num_outputs
            )));
        }
        if !(0.0..=10.0).contains(&self.guidance_scale) {
            return Err(ForgeError::ConfigError(format!(
                "guidance_scale must be between 0.0 and 10.0, got {}",
                self.guidance_scale
            )));
        }
        if !(1..=50).contains(&self.inference_steps) {
            return Err(ForgeError::ConfigError(format!(
                "inference_steps must be between 1 and 50, got {}",
                self.inference_steps
            )));
        }
        if self.output_quality > 100 {
            return Err(ForgeError::ConfigError(format!(
                "output_quality must be between 0 and 100, got {}",
                self.output_quality
            )));
        }
        Ok(())
    }
}

/// One user submission. Built once, passed through the pipeline, dropped
/// when the cycle completes.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub skip_enhancement: bool,
    pub params: ImageParams,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        GenerationRequest {
            topic: topic.into(),
            skip_enhancement: false,
            params: ImageParams::default(),
        }
    }

    pub fn with_params(mut self, params: ImageParams) -> Self {
        self.params = params;
        self
    }

    pub fn skip_enhancement(mut self, skip: bool) -> Self {
        self.skip_enhancement = skip;
        self
    }
}

/// A single generated image as returned by a back-end. URL-shaped results
/// need a fetch before display; base64 results need a decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedImage {
    Url(String),
    Base64(String),
}
