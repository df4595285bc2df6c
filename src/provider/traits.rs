//! Common traits and types for inpainting providers

use async_trait::async_trait;

use crate::error::Result;

/// One inpainting job: the source image, its mask and the prompt
#[derive(Debug, Clone)]
pub struct InpaintRequest {
    /// Source image, PNG encoded
    pub image: Vec<u8>,

    /// Single-channel mask, PNG encoded; 0 marks pixels to regenerate
    pub mask: Vec<u8>,

    /// Text describing what to paint into the masked region
    pub prompt: String,
}

/// Trait for inpainting backends
///
/// Implementations make exactly one attempt per call. Transport and API
/// failures map to `AppError::ProviderCall`; a response without usable image
/// bytes maps to `AppError::ProviderOutput`.
#[async_trait]
pub trait InpaintProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Run the model and return the generated image bytes
    async fn inpaint(&self, request: InpaintRequest) -> Result<Vec<u8>>;
}
