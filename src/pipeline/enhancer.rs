use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::GeminiConfig,
    error::{ForgeError, Result},
    models::EnhancedPrompt,
};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequestBody {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseBody {
    candidates: Option<Vec<GeminiCandidate>>,
}

/// Build the single-turn instruction handed to the chat-completion model.
/// Stateless; no conversation history is carried between calls.
pub fn build_enhance_template(topic: &str) -> String {
    format!(
        "You are an expert prompt writer for text-to-image diffusion models. \
         Rewrite the idea below into one richly detailed image prompt. Expand it \
         with concrete subject details, setting, lighting, mood, composition and \
         style cues, keeping the original intent. Reply with only the final \
         prompt, either as plain text or as a JSON object with a \"prompt\" field.\n\n\
         Idea: {}",
        topic
    )
}

/// Rewrites user topics into detail-expanded image prompts via the hosted
/// Generative Language API. Each call is a fresh single-turn exchange with
/// fixed sampling parameters.
pub struct GeminiEnhancer {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiEnhancer {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| ForgeError::ConfigError("Gemini API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Point the enhancer at a different API host (proxies, local gateways).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn enhance(&self, topic: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );

        let body = GeminiRequestBody {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_enhance_template(topic),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 1.0,
                top_p: 0.95,
                top_k: 64,
                max_output_tokens: 8192,
            },
        };

        log::debug!("Enhancing topic with model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("X-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::RequestError(format!("enhancement request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ForgeError::EnhanceError(format!(
                "enhancement endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: GeminiResponseBody = response
            .json()
            .await
            .map_err(|e| ForgeError::ResponseError(format!("enhancement parse error: {}", e)))?;

        let raw = extract_candidate_text(body).ok_or_else(|| {
            ForgeError::ResponseError("no text in enhancement response".into())
        })?;

        let prompt = EnhancedPrompt::parse(&raw).into_prompt();
        if prompt.is_empty() {
            return Err(ForgeError::EnhanceError(
                "enhancement produced an empty prompt".into(),
            ));
        }

        log::debug!("Enhanced prompt: {}", prompt);
        Ok(prompt)
    }
}

/// First non-empty text part across candidates.
fn extract_candidate_text(body: GeminiResponseBody) -> Option<String> {
    for candidate in body.candidates? {
        let parts = match candidate.content.and_then(|content| content.parts) {
            Some(parts) => parts,
            None => continue,
        };
        for part in parts {
            if let Some(text) = part.text {
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_embeds_topic() {
        let template = build_enhance_template("a red bicycle");
        assert!(template.contains("Idea: a red bicycle"));
    }

    #[test]
    fn test_template_accepts_empty_topic() {
        let template = build_enhance_template("");
        assert!(template.ends_with("Idea: "));
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = GeminiEnhancer::new(GeminiConfig::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_default_model() {
        let enhancer = GeminiEnhancer::new(GeminiConfig::new().with_api_key("test")).unwrap();
        assert_eq!(enhancer.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_extract_candidate_text_walks_candidates() {
        let body = GeminiResponseBody {
            candidates: Some(vec![
                GeminiCandidate { content: None },
                GeminiCandidate {
                    content: Some(GeminiResponseContent {
                        parts: Some(vec![
                            GeminiResponsePart { text: None },
                            GeminiResponsePart {
                                text: Some("found".to_string()),
                            },
                        ]),
                    }),
                },
            ]),
        };
        assert_eq!(extract_candidate_text(body), Some("found".to_string()));
    }
}
