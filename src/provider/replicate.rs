//! Replicate HTTP client for hosted inpainting models

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::provider::data_url;
use crate::provider::traits::{InpaintProvider, InpaintRequest};

/// Inpainting through a Replicate-hosted model
pub struct ReplicateProvider {
    client: Client,
    api_base: String,
    model: String,
    api_token: String,
    aspect_ratio: String,
    magic_prompt_option: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

/// Body of a model prediction request
#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

/// Resolution and style are left out so the model applies its own defaults
#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    image: String,
    mask: String,
    aspect_ratio: &'a str,
    magic_prompt_option: &'a str,
}

/// Prediction object as returned by create and poll calls
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

enum PredictionState {
    Succeeded,
    Pending,
    Failed,
    Unknown,
}

impl Prediction {
    fn state(&self) -> PredictionState {
        match self.status.to_ascii_lowercase().as_str() {
            "succeeded" => PredictionState::Succeeded,
            "starting" | "processing" => PredictionState::Pending,
            "failed" | "canceled" | "aborted" => PredictionState::Failed,
            _ => PredictionState::Unknown,
        }
    }

    fn failure_message(&self) -> String {
        match &self.error {
            Value::String(message) => message.clone(),
            Value::Null => format!("prediction {}", self.status),
            other => other.to_string(),
        }
    }

    /// First output location; models return either one URL or a list of them
    fn output_location(&self) -> Option<&str> {
        let location = match &self.output {
            Value::String(location) => Some(location.as_str()),
            Value::Array(items) => items.iter().find_map(Value::as_str),
            _ => None,
        }?;

        let location = location.trim();
        if location.starts_with("http") || location.starts_with("data:") {
            Some(location)
        } else {
            None
        }
    }
}

impl ReplicateProvider {
    /// Create a new provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.trim_matches('/').to_string(),
            api_token: config.api_token.clone(),
            aspect_ratio: config.aspect_ratio.clone(),
            magic_prompt_option: config.magic_prompt_option.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
        })
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/models/{}/predictions", self.api_base, self.model)
    }

    async fn create_prediction(&self, request: &InpaintRequest) -> Result<Prediction> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt: &request.prompt,
                image: data_url::create_data_url(&request.image, "png"),
                mask: data_url::create_data_url(&request.mask, "png"),
                aspect_ratio: &self.aspect_ratio,
                magic_prompt_option: &self.magic_prompt_option,
            },
        };

        let endpoint = self.predictions_endpoint();
        debug!(model = %self.model, endpoint = %endpoint, "Creating prediction");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(call_error)?;

        read_prediction(response).await
    }

    /// Follow a pending prediction until it settles or the poll budget runs out
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction> {
        let started = Instant::now();

        loop {
            match prediction.state() {
                PredictionState::Pending => {}
                _ => return Ok(prediction),
            }

            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.clone())
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    AppError::ProviderOutput("pending prediction has no poll URL".to_string())
                })?;

            if started.elapsed() >= self.poll_timeout {
                return Err(AppError::ProviderCall(format!(
                    "prediction still {} after {}s",
                    prediction.status,
                    self.poll_timeout.as_secs()
                )));
            }

            tokio::time::sleep(self.poll_interval).await;

            debug!(url = %poll_url, status = %prediction.status, "Polling prediction");

            let response = self
                .client
                .get(&poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .map_err(call_error)?;

            prediction = read_prediction(response).await?;
        }
    }

    async fn fetch_output(&self, location: &str) -> Result<Vec<u8>> {
        if location.starts_with("data:") {
            return data_url::decode(location);
        }

        let mut request = self.client.get(location);
        // Files served from the API host itself need the credential
        if location.starts_with(&self.api_base) {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request.send().await.map_err(call_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ProviderCall(format!(
                "output download returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await.map_err(call_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl InpaintProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn inpaint(&self, request: InpaintRequest) -> Result<Vec<u8>> {
        let prediction = self.create_prediction(&request).await?;
        let prediction = self.wait_for(prediction).await?;

        match prediction.state() {
            PredictionState::Succeeded => {}
            PredictionState::Failed => {
                warn!(
                    prediction = ?prediction.id,
                    status = %prediction.status,
                    "Prediction did not succeed"
                );
                return Err(AppError::ProviderCall(prediction.failure_message()));
            }
            PredictionState::Pending | PredictionState::Unknown => {
                return Err(AppError::ProviderOutput(format!(
                    "unexpected prediction status '{}'",
                    prediction.status
                )));
            }
        }

        let location = prediction.output_location().ok_or_else(|| {
            AppError::ProviderOutput(format!("unexpected output shape: {}", prediction.output))
        })?;

        let bytes = self.fetch_output(location).await?;
        if bytes.is_empty() {
            return Err(AppError::ProviderOutput("empty image payload".to_string()));
        }

        info!(
            prediction = ?prediction.id,
            model = %self.model,
            size = bytes.len(),
            "Prediction succeeded"
        );

        Ok(bytes)
    }
}

fn call_error(e: reqwest::Error) -> AppError {
    AppError::ProviderCall(e.to_string())
}

async fn read_prediction(response: Response) -> Result<Prediction> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ProviderCall(format!(
            "Replicate returned {}: {}",
            status, body
        )));
    }

    response
        .json::<Prediction>()
        .await
        .map_err(|e| AppError::ProviderOutput(format!("unreadable prediction: {}", e)))
}
