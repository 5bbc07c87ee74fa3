pub mod replicate;
pub mod together;

use async_trait::async_trait;

use crate::{
    error::{ForgeError, Result},
    models::{GeneratedImage, ImageParams},
};

pub use replicate::ReplicateBackend;
pub use together::TogetherBackend;

/// A hosted image-generation service. Implementations pass through the
/// subset of `ImageParams` their API accepts and drop the rest.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<Vec<GeneratedImage>>;
}

/// A successful call returns exactly `expected` images; anything short is
/// treated as a failed call, not a partial result.
pub(crate) fn ensure_count(
    backend: &str,
    images: Vec<GeneratedImage>,
    expected: u32,
) -> Result<Vec<GeneratedImage>> {
    if images.len() != expected as usize {
        return Err(ForgeError::BackendError {
            backend: backend.to_string(),
            message: format!("expected {} images, got {}", expected, images.len()),
        });
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_count_exact() {
        let images = vec![GeneratedImage::Url("https://example.com/a.webp".into())];
        assert!(ensure_count("replicate", images, 1).is_ok());
    }

    #[test]
    fn test_ensure_count_short() {
        let images = vec![GeneratedImage::Url("https://example.com/a.webp".into())];
        let err = ensure_count("replicate", images, 2).unwrap_err();
        assert!(err.to_string().contains("expected 2 images, got 1"));
    }
}
