pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod output;
pub mod pipeline;

pub use config::{BackendKind, Config, GeminiConfig, ReplicateConfig, TogetherConfig};
pub use error::{ForgeError, Result};
pub use models::{
    AspectRatio, EnhancedPrompt, GeneratedImage, GenerationRequest, ImageParams, OutputFormat,
    PipelineState,
};
pub use output::{ArchiveBuilder, GalleryImage, Presenter};
pub use pipeline::{
    build_enhance_template, ForgeClient, GeminiEnhancer, ImageBackend, PipelineOutcome,
    ReplicateBackend, Session, TogetherBackend,
};
