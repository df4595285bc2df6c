//! Inpainting pipeline - from a posted form to a stored output image
//!
//! One call walks `ReceivedForm -> Loaded -> MaskBuilt -> InferenceCalled ->
//! Persisted`. Any failure short-circuits with the stage it happened in
//! logged, and nothing is written to the output store unless the provider
//! returned usable bytes.

use image::DynamicImage;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::mask::{self, MaskRectangle};
use crate::provider::{InpaintProvider, InpaintRequest};
use crate::storage::{detect_image_format, FileStore};

/// Fields posted to `/process_image`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessForm {
    pub image_filename: Option<String>,
    pub mask_data: Option<String>,
    pub prompt: Option<String>,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub request_id: Uuid,
    pub output_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ReceivedForm,
    Loaded,
    MaskBuilt,
    InferenceCalled,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ReceivedForm => "received_form",
            Stage::Loaded => "loaded",
            Stage::MaskBuilt => "mask_built",
            Stage::InferenceCalled => "inference_called",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Composes storage, mask rasterization and the inference provider
pub struct InpaintPipeline {
    uploads: FileStore,
    outputs: FileStore,
    provider: Arc<dyn InpaintProvider>,
    keep_intermediates: bool,
}

impl InpaintPipeline {
    pub fn new(uploads: FileStore, outputs: FileStore, provider: Arc<dyn InpaintProvider>) -> Self {
        Self {
            uploads,
            outputs,
            provider,
            keep_intermediates: false,
        }
    }

    /// Also write `init_*`/`mask_*` PNGs to the uploads store on each run
    pub fn with_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn uploads(&self) -> &FileStore {
        &self.uploads
    }

    pub fn outputs(&self) -> &FileStore {
        &self.outputs
    }

    /// Run one request end to end
    pub async fn process(&self, form: ProcessForm) -> Result<ProcessOutcome> {
        let request_id = Uuid::new_v4();
        let mut stage = Stage::ReceivedForm;

        match self.run(request_id, form, &mut stage).await {
            Ok(outcome) => {
                info!(
                    request_id = %request_id,
                    provider = %self.provider.name(),
                    output = %outcome.output_filename,
                    "Inpainting completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    stage = %stage,
                    error = %e,
                    detail = ?e,
                    "Inpainting failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request_id: Uuid,
        form: ProcessForm,
        stage: &mut Stage,
    ) -> Result<ProcessOutcome> {
        let image_filename = required(form.image_filename, "image_filename")?;
        let mask_data = required(form.mask_data, "mask_data")?;
        let prompt = required(form.prompt, "prompt")?;

        // Parsed before any storage or network access
        let rect = MaskRectangle::from_json(&mask_data)?;

        let raw = self.uploads.read(&image_filename).await?;
        let original = DynamicImage::ImageRgb8(image::load_from_memory(&raw)?.to_rgb8());
        advance(request_id, stage, Stage::Loaded);

        let mask_image = mask::rasterize(original.width(), original.height(), &rect);
        let image_png = mask::encode_png(&original)?;
        let mask_png = mask::encode_png(&DynamicImage::ImageLuma8(mask_image))?;
        advance(request_id, stage, Stage::MaskBuilt);

        if self.keep_intermediates {
            self.save_intermediates(request_id, &image_filename, &image_png, &mask_png)
                .await?;
        }

        let generated = self
            .provider
            .inpaint(InpaintRequest {
                image: image_png,
                mask: mask_png,
                prompt,
            })
            .await?;

        if generated.is_empty() {
            return Err(AppError::ProviderOutput(format!(
                "{} returned an empty payload",
                self.provider.name()
            )));
        }
        advance(request_id, stage, Stage::InferenceCalled);

        let extension = detect_image_format(&generated).unwrap_or("png");
        let output_filename = format!("generated_{}.{}", request_id.simple(), extension);
        self.outputs.save(&output_filename, &generated).await?;
        advance(request_id, stage, Stage::Persisted);

        Ok(ProcessOutcome {
            request_id,
            output_filename,
        })
    }

    async fn save_intermediates(
        &self,
        request_id: Uuid,
        image_filename: &str,
        image_png: &[u8],
        mask_png: &[u8],
    ) -> Result<()> {
        let stem = Path::new(image_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let id = request_id.simple();

        self.uploads
            .save(&format!("init_{}_{}.png", id, stem), image_png)
            .await?;
        self.uploads
            .save(&format!("mask_{}_{}.png", id, stem), mask_png)
            .await?;
        Ok(())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| AppError::MalformedRequest(format!("missing form field '{}'", field)))
}

fn advance(request_id: Uuid, stage: &mut Stage, next: Stage) {
    debug!(request_id = %request_id, from = %stage, to = %next, "Pipeline stage");
    *stage = next;
}
