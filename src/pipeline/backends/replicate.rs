use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::ReplicateConfig,
    error::{ForgeError, Result},
    models::{GeneratedImage, ImageParams},
    pipeline::backends::{ensure_count, ImageBackend},
};

const DEFAULT_MODEL: &str = "black-forest-labs/flux-dev";
const API_BASE: &str = "https://api.replicate.com/v1";

#[derive(Debug, Deserialize)]
struct ReplicatePrediction {
    status: Option<String>,
    output: Option<Vec<String>>,
    error: Option<String>,
}

/// Replicate predictions API. The model is ratio-addressed, so explicit
/// width/height are dropped; everything else in `ImageParams` passes
/// through. Uses sync mode (`Prefer: wait`) so the prediction response
/// already carries output URLs.
pub struct ReplicateBackend {
    client: Client,
    api_token: String,
    model: String,
}

impl ReplicateBackend {
    pub fn new(config: ReplicateConfig) -> Result<Self> {
        let api_token = config
            .api_token
            .ok_or_else(|| ForgeError::ConfigError("Replicate API token is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_token,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Input payload for the prediction. Seed 0 counts as unset and is
    /// omitted so the service picks one.
    pub fn build_input(prompt: &str, params: &ImageParams) -> Value {
        let mut input = json!({
            "prompt": prompt,
            "guidance": params.guidance_scale,
            "num_outputs": params.num_outputs,
            "num_inference_steps": params.inference_steps,
            "aspect_ratio": params.aspect_ratio.as_str(),
            "output_format": params.output_format.as_str(),
            "output_quality": params.output_quality,
            "disable_safety_checker": params.disable_safety_checker,
        });

        if let Some(seed) = params.effective_seed() {
            input["seed"] = json!(seed);
        }

        input
    }
}

#[async_trait]
impl ImageBackend for ReplicateBackend {
    fn name(&self) -> &'static str {
        "replicate"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<Vec<GeneratedImage>> {
        let url = format!("{}/models/{}/predictions", API_BASE, self.model);
        let payload = json!({ "input": Self::build_input(prompt, params) });

        log::info!("Generating {} image(s) with model: {}", params.num_outputs, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ForgeError::BackendError {
                backend: "replicate".to_string(),
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ForgeError::BackendError {
                backend: "replicate".to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let prediction: ReplicatePrediction = response
            .json()
            .await
            .map_err(|e| ForgeError::ResponseError(format!("prediction parse error: {}", e)))?;

        if let Some(error) = prediction.error {
            return Err(ForgeError::BackendError {
                backend: "replicate".to_string(),
                message: error,
            });
        }

        if matches!(prediction.status.as_deref(), Some("failed") | Some("canceled")) {
            return Err(ForgeError::BackendError {
                backend: "replicate".to_string(),
                message: format!(
                    "prediction ended with status '{}'",
                    prediction.status.as_deref().unwrap_or("unknown")
                ),
            });
        }

        let urls = prediction
            .output
            .ok_or_else(|| ForgeError::ResponseError("prediction carried no output".into()))?;

        let images = urls.into_iter().map(GeneratedImage::Url).collect();
        ensure_count(self.name(), images, params.num_outputs)
    }
}
