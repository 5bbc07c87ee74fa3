use serde_json::{Map, Value};

/// What a chat-completion model hands back when asked to rewrite a topic:
/// either free text or a JSON object carrying a "prompt" field. Modeled as
/// a tagged variant so normalization happens in exactly one place.
#[derive(Debug, Clone, PartialEq)]
pub enum EnhancedPrompt {
    Plain(String),
    Structured(Map<String, Value>),
}

impl EnhancedPrompt {
    /// Classify a raw model response. Tries a raw JSON object first, then a
    /// markdown-fenced JSON block, and falls back to plain text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            return EnhancedPrompt::Structured(map);
        }

        if let Some(block) = extract_json_block(trimmed) {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&block) {
                return EnhancedPrompt::Structured(map);
            }
        }

        EnhancedPrompt::Plain(trimmed.to_string())
    }

    /// Normalize to the single prompt string a back-end receives. A
    /// structured response without a "prompt" field yields an empty string,
    /// which callers treat as a failed enhancement.
    pub fn into_prompt(self) -> String {
        match self {
            EnhancedPrompt::Plain(text) => text.trim().to_string(),
            EnhancedPrompt::Structured(map) => map
                .get("prompt")
                .and_then(|value| value.as_str())
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Extract JSON from ```json ... ``` code blocks.
fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let parsed = EnhancedPrompt::parse("A vivid red bicycle against a brick wall");
        assert_eq!(
            parsed,
            EnhancedPrompt::Plain("A vivid red bicycle against a brick wall".to_string())
        );
    }

    #[test]
    fn test_parse_json_object() {
        let parsed = EnhancedPrompt::parse(r#"{"prompt": "golden hour light"}"#);
        assert_eq!(parsed.into_prompt(), "golden hour light");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Here you go:\n```json\n{\"prompt\": \"a misty forest\"}\n```\n";
        let parsed = EnhancedPrompt::parse(raw);
        assert_eq!(parsed.into_prompt(), "a misty forest");
    }

    #[test]
    fn test_missing_prompt_field_is_empty() {
        let parsed = EnhancedPrompt::parse(r#"{"caption": "not a prompt"}"#);
        assert_eq!(parsed.into_prompt(), "");
    }

    #[test]
    fn test_plain_text_passes_through_trimmed() {
        let parsed = EnhancedPrompt::parse("  padded text  ");
        assert_eq!(parsed.into_prompt(), "padded text");
    }

    #[test]
    fn test_extract_json_block() {
        let text = "text\n```json\n{\"a\":1}\n```\nmore";
        assert_eq!(extract_json_block(text), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_extract_json_block_none() {
        assert_eq!(extract_json_block("no code block"), None);
    }
}
