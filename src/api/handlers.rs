//! Route handlers

use axum::{
    extract::{rejection::FormRejection, Multipart, Path, State},
    response::{Html, Redirect},
    Form,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::pages;
use crate::error::{AppError, Result};
use crate::pipeline::ProcessForm;
use crate::storage::{allowed_file, sanitize_filename};
use crate::AppState;

/// `GET /`
pub async fn index() -> Html<String> {
    Html(pages::upload_page())
}

/// `POST /upload`
///
/// Rejected uploads (no file, empty name, disallowed extension) never reach
/// storage and simply send the user back to the form.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let back = Redirect::to("/");

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Unreadable upload form");
                return Ok(back);
            }
        };

        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.is_empty() {
            debug!("Upload without a filename");
            return Ok(back);
        }

        if !allowed_file(&original_name, &state.settings.storage.allowed_extensions) {
            debug!(filename = %original_name, "Upload with disallowed extension");
            return Ok(back);
        }

        let filename = sanitize_filename(&original_name);
        if !allowed_file(&filename, &state.settings.storage.allowed_extensions) {
            debug!(filename = %original_name, "Upload filename sanitized away");
            return Ok(back);
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to read upload body");
                return Ok(back);
            }
        };

        state.pipeline.uploads().save(&filename, &data).await?;
        info!(filename = %filename, size = data.len(), "Stored upload");

        return Ok(Redirect::to(&format!("/edit/{}", filename)));
    }

    debug!("Upload form without an image field");
    Ok(back)
}

/// `GET /edit/:image_filename`
pub async fn edit(Path(image_filename): Path<String>) -> Html<String> {
    Html(pages::edit_page(&image_filename))
}

/// `POST /process_image`
pub async fn process_image(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<ProcessForm>, FormRejection>,
) -> Result<Html<String>> {
    let Form(form) = form.map_err(|e| AppError::MalformedRequest(e.body_text()))?;

    let outcome = state.pipeline.process(form).await?;
    Ok(Html(pages::result_page(&outcome.output_filename)))
}
