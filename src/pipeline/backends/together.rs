use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::TogetherConfig,
    error::{ForgeError, Result},
    models::{GeneratedImage, ImageParams},
    pipeline::backends::{ensure_count, ImageBackend},
};

const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
const API_URL: &str = "https://api.together.xyz/v1/images/generations";

#[derive(Debug, Serialize)]
pub struct TogetherImageRequest {
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub response_format: String,
}

#[derive(Debug, Deserialize)]
struct TogetherImageResponse {
    data: Vec<TogetherImageData>,
}

#[derive(Debug, Deserialize)]
struct TogetherImageData {
    b64_json: String,
}

/// Together images endpoint. Pixel-addressed: honors width/height, steps,
/// count and seed; aspect ratio, output format/quality and the safety flag
/// have no wire representation here and are dropped. Always requests
/// base64 payloads so results decode locally.
pub struct TogetherBackend {
    client: Client,
    api_key: String,
    model: String,
}

impl TogetherBackend {
    pub fn new(config: TogetherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| ForgeError::ConfigError("Together API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, prompt: &str, params: &ImageParams) -> TogetherImageRequest {
        TogetherImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            width: params.width,
            height: params.height,
            steps: params.inference_steps,
            n: params.num_outputs,
            seed: params.effective_seed(),
            response_format: "b64_json".to_string(),
        }
    }
}

#[async_trait]
impl ImageBackend for TogetherBackend {
    fn name(&self) -> &'static str {
        "together"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<Vec<GeneratedImage>> {
        let request = self.build_request(prompt, params);

        log::info!("Generating {} image(s) with model: {}", params.num_outputs, self.model);

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ForgeError::BackendError {
                backend: "together".to_string(),
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ForgeError::BackendError {
                backend: "together".to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let body: TogetherImageResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::ResponseError(format!("image response parse error: {}", e)))?;

        let images = body
            .data
            .into_iter()
            .map(|item| GeneratedImage::Base64(item.b64_json))
            .collect();
        ensure_count(self.name(), images, params.num_outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, OutputFormat};

    fn backend() -> TogetherBackend {
        TogetherBackend::new(TogetherConfig::new().with_api_key("test")).unwrap()
    }

    #[test]
    fn test_new_requires_key() {
        assert!(TogetherBackend::new(TogetherConfig::new()).is_err());
    }

    #[test]
    fn test_request_passes_supported_fields() {
        let params = ImageParams::new()
            .with_dimensions(768, 512)
            .with_inference_steps(12)
            .with_num_outputs(3)
            .with_seed(99);
        let request = backend().build_request("a red bicycle", &params);

        assert_eq!(request.prompt, "a red bicycle");
        assert_eq!(request.width, 768);
        assert_eq!(request.height, 512);
        assert_eq!(request.steps, 12);
        assert_eq!(request.n, 3);
        assert_eq!(request.seed, Some(99));
        assert_eq!(request.response_format, "b64_json");
    }

    #[test]
    fn test_request_drops_unsupported_fields() {
        let params = ImageParams::new()
            .with_aspect_ratio(AspectRatio::Portrait)
            .with_output_format(OutputFormat::Jpg)
            .with_output_quality(10);
        let request = backend().build_request("x", &params);
        let wire = serde_json::to_value(&request).unwrap();

        assert!(wire.get("aspect_ratio").is_none());
        assert!(wire.get("output_format").is_none());
        assert!(wire.get("output_quality").is_none());
        assert!(wire.get("disable_safety_checker").is_none());
    }

    #[test]
    fn test_zero_seed_omitted_from_wire() {
        let request = backend().build_request("x", &ImageParams::new().with_seed(0));
        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("seed").is_none());
    }
}
