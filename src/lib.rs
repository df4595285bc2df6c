//! Inpaint Studio
//!
//! A small web front-end for mask-based inpainting: upload an image, drag a
//! rectangle over the region to repaint, describe the change, and let a
//! hosted model generate the result.

pub mod api;
pub mod config;
pub mod error;
pub mod mask;
pub mod middleware;
pub mod pipeline;
pub mod provider;
pub mod storage;

pub use error::{AppError, Result};

use std::sync::Arc;

use pipeline::InpaintPipeline;
use provider::InpaintProvider;
use storage::FileStore;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub pipeline: Arc<InpaintPipeline>,
}

impl AppState {
    /// Wire the stores and the given provider into a pipeline
    pub fn new(settings: config::Settings, provider: Arc<dyn InpaintProvider>) -> Self {
        let uploads = FileStore::new(&settings.storage.upload_dir);
        let outputs = FileStore::new(&settings.storage.output_dir);
        let pipeline = InpaintPipeline::new(uploads, outputs, provider)
            .with_intermediates(settings.storage.keep_intermediates);

        Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(pipeline),
        }
    }
}
