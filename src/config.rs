use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Replicate,
    Together,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Replicate => "replicate",
            BackendKind::Together => "together",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "replicate" => Some(BackendKind::Replicate),
            "together" => Some(BackendKind::Together),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TogetherConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub gemini: Option<GeminiConfig>,
    pub replicate: Option<ReplicateConfig>,
    pub together: Option<TogetherConfig>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        let model = env::var("GEMINI_MODEL").ok();

        GeminiConfig { api_key, model }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        ReplicateConfig {
            api_token: None,
            model: None,
        }
    }
}

impl ReplicateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_token = env::var("REPLICATE_API_TOKEN").ok();
        let model = env::var("REPLICATE_MODEL").ok();

        ReplicateConfig { api_token, model }
    }

    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for TogetherConfig {
    fn default() -> Self {
        TogetherConfig {
            api_key: None,
            model: None,
        }
    }
}

impl TogetherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("TOGETHER_API_KEY").ok();
        let model = env::var("TOGETHER_MODEL").ok();

        TogetherConfig { api_key, model }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::Replicate,
            gemini: None,
            replicate: None,
            together: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let backend = env::var("IMAGE_BACKEND")
            .ok()
            .and_then(|val| BackendKind::from_str(&val))
            .unwrap_or(BackendKind::Replicate);

        Config {
            backend,
            gemini: Some(GeminiConfig::from_env()),
            replicate: Some(ReplicateConfig::from_env()),
            together: Some(TogetherConfig::from_env()),
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn with_replicate(mut self, config: ReplicateConfig) -> Self {
        self.replicate = Some(config);
        self.backend = BackendKind::Replicate;
        self
    }

    pub fn with_together(mut self, config: TogetherConfig) -> Self {
        self.together = Some(config);
        self.backend = BackendKind::Together;
        self
    }
}
