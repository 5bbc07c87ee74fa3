pub mod backends;
pub mod enhancer;

use crate::{
    config::{BackendKind, Config},
    error::{ForgeError, Result},
    models::{GeneratedImage, GenerationRequest, PipelineState},
};

pub use backends::{ImageBackend, ReplicateBackend, TogetherBackend};
pub use enhancer::{build_enhance_template, GeminiEnhancer};

/// Per-user session. Holds the prompt text of the last successful
/// generation until explicitly cleared, plus the submission lifecycle
/// state. Sessions are independent; nothing is shared across them.
#[derive(Debug, Clone)]
pub struct Session {
    prompt: Option<String>,
    state: PipelineState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            prompt: None,
            state: PipelineState::Idle,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn clear(&mut self) {
        self.prompt = None;
        self.state = PipelineState::Idle;
    }

    fn transition(&mut self, state: PipelineState) {
        log::debug!("Session state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

/// Result of one completed submission.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The prompt the back-end actually received.
    pub prompt: String,
    /// Whether `prompt` came out of the enhancement step.
    pub enhanced: bool,
    pub images: Vec<GeneratedImage>,
}

/// Top-level client owning the prompt enhancer and the configured image
/// back-end.
pub struct ForgeClient {
    enhancer: GeminiEnhancer,
    backend: Box<dyn ImageBackend>,
}

impl ForgeClient {
    pub fn new(config: Config) -> Result<Self> {
        let gemini = config
            .gemini
            .ok_or_else(|| ForgeError::ConfigError("Gemini configuration is required".into()))?;
        let enhancer = GeminiEnhancer::new(gemini)?;

        let backend: Box<dyn ImageBackend> = match config.backend {
            BackendKind::Replicate => {
                let replicate = config.replicate.ok_or_else(|| {
                    ForgeError::ConfigError("Replicate configuration is required".into())
                })?;
                Box::new(ReplicateBackend::new(replicate)?)
            }
            BackendKind::Together => {
                let together = config.together.ok_or_else(|| {
                    ForgeError::ConfigError("Together configuration is required".into())
                })?;
                Box::new(TogetherBackend::new(together)?)
            }
        };

        Ok(Self { enhancer, backend })
    }

    /// Assemble a client from an enhancer and any `ImageBackend`
    /// implementation, bypassing `Config`-driven selection.
    pub fn from_parts(enhancer: GeminiEnhancer, backend: Box<dyn ImageBackend>) -> Self {
        Self { enhancer, backend }
    }

    pub fn enhancer(&self) -> &GeminiEnhancer {
        &self.enhancer
    }

    pub fn backend(&self) -> &dyn ImageBackend {
        self.backend.as_ref()
    }

    /// Run one submission through the pipeline: validate, optionally
    /// enhance, generate. The session tracks the lifecycle and keeps the
    /// final prompt until cleared.
    ///
    /// A failed enhancement falls back to the raw topic with a warning;
    /// a failed generation is an error and leaves no partial results.
    pub async fn run(
        &self,
        request: GenerationRequest,
        session: &mut Session,
    ) -> Result<PipelineOutcome> {
        request.params.validate()?;
        session.transition(PipelineState::Idle);

        let (prompt, enhanced) = if request.skip_enhancement {
            (request.topic.clone(), false)
        } else {
            session.transition(PipelineState::Enhancing);
            match self.enhancer.enhance(&request.topic).await {
                Ok(enhanced_prompt) => (enhanced_prompt, true),
                Err(e) => {
                    log::warn!(
                        "⚠️  Enhancement failed, falling back to the raw topic: {}",
                        e
                    );
                    (request.topic.clone(), false)
                }
            }
        };

        session.transition(PipelineState::Generating);
        match self.backend.generate(&prompt, &request.params).await {
            Ok(images) => {
                session.transition(PipelineState::Displaying);
                session.prompt = Some(prompt.clone());
                Ok(PipelineOutcome {
                    prompt,
                    enhanced,
                    images,
                })
            }
            Err(e) => {
                session.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }
}
