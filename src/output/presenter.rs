use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine};
use reqwest::Client;
use tokio::fs;

use crate::{
    error::{ForgeError, Result},
    models::{GeneratedImage, OutputFormat},
    output::archive::ArchiveBuilder,
};

/// Turns back-end results into bytes on disk or a downloadable archive.
/// URL results are fetched over HTTP; base64 results are decoded locally.
pub struct Presenter {
    client: Client,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Resolve one generated image to raw bytes.
    pub async fn resolve(&self, image: &GeneratedImage) -> Result<Vec<u8>> {
        match image {
            GeneratedImage::Url(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(ForgeError::ResponseError(format!(
                        "image fetch returned HTTP {}",
                        response.status()
                    )));
                }
                Ok(response.bytes().await?.to_vec())
            }
            GeneratedImage::Base64(payload) => decode_base64(payload),
        }
    }

    /// Write every image to `dir` as `output_file_<n>.<ext>` and return the
    /// written paths.
    pub async fn save_all(
        &self,
        images: &[GeneratedImage],
        dir: &Path,
        format: OutputFormat,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).await?;

        let mut paths = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let bytes = self.resolve(image).await?;
            let path = dir.join(format!("output_file_{}.{}", i + 1, format.extension()));
            fs::write(&path, bytes).await?;
            log::info!("💾 Image saved to: {}", path.display());
            paths.push(path);
        }
        Ok(paths)
    }

    /// Bundle all images into one zip. An image whose fetch or decode
    /// fails is skipped with a warning; the archive simply ends up with
    /// fewer entries.
    pub async fn build_archive(
        &self,
        images: &[GeneratedImage],
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        let mut builder = ArchiveBuilder::new(format);

        for (i, image) in images.iter().enumerate() {
            match self.resolve(image).await {
                Ok(bytes) => builder.add_image(&bytes)?,
                Err(e) => {
                    log::warn!("⚠️  Skipping image {} in archive: {}", i + 1, e);
                }
            }
        }

        builder.finish()
    }
}

/// Decode a base64 payload, tolerating `data:` URI prefixes.
fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let encoded = match payload.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };

    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ForgeError::ResponseError(format!("base64 decode failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        let encoded = general_purpose::STANDARD.encode(b"image bytes");
        assert_eq!(decode_base64(&encoded).unwrap(), b"image bytes");
    }

    #[test]
    fn test_decode_data_uri() {
        let encoded = general_purpose::STANDARD.encode(b"webp data");
        let uri = format!("data:image/webp;base64,{}", encoded);
        assert_eq!(decode_base64(&uri).unwrap(), b"webp data");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64("not-base64!!!").is_err());
    }
}
