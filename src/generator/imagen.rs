//! Imagen client for the Generative Language `predict` endpoint.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use super::{GenerateFuture, GenerationRequest, ImageGenerator};
use crate::config::ApiKeySource;
use crate::constants::{API_KEY_HEADER, BATCH_SIZE, ENTITY_NOT_FOUND, OUTPUT_MIME_TYPE};
use crate::data_url::DataUrl;
use crate::error::StudioError;

// -----------------------------
// Wire types
// -----------------------------

/// Request body for POST {base}/models/{model}:predict
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictInstance<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u8,
    aspect_ratio: &'a str,
    output_options: OutputOptions<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutputOptions<'a> {
    mime_type: &'a str,
}

#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

// Filtered predictions come back without bytes.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

enum CallFailure {
    Upstream(String),
    NoImages,
}

// -----------------------------
// Client
// -----------------------------

/// Talks to Imagen over REST. The API key is looked up on every call.
#[derive(Clone, Debug)]
pub struct ImagenClient {
    http: reqwest::Client,
    base_url: Url,
    model: String,
    api_key: ApiKeySource,
}

impl ImagenClient {
    /// Builds a client for `model` under `base_url` (e.g. `.../v1beta`).
    pub fn new(base_url: Url, model: impl Into<String>, api_key: ApiKeySource) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model: model.into(),
            api_key,
        }
    }

    /// The model every request targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:predict",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }

    /// Generates one batch and returns the images as `data:` URLs, in provider order.
    pub async fn generate_images(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<String>, StudioError> {
        let Some(api_key) = self.api_key.resolve() else {
            return Err(StudioError::Configuration(format!(
                "{} environment variable is not set. Please provide it.",
                self.api_key.describe()
            )));
        };

        let reference = request
            .reference_image
            .as_deref()
            .map(DataUrl::parse)
            .transpose()?;

        match self.predict(&api_key, request, reference.as_ref()).await {
            Ok(images) => Ok(images),
            Err(CallFailure::NoImages) => {
                error!("No images generated for prompt {:?}", request.prompt);
                Err(StudioError::Generation(
                    "Failed to generate images. No images returned from API.".to_string(),
                ))
            }
            Err(CallFailure::Upstream(message)) => {
                error!("Error generating images: {message}");
                Err(self.describe_failure(&message))
            }
        }
    }

    fn describe_failure(&self, message: &str) -> StudioError {
        if message.contains(ENTITY_NOT_FOUND) {
            error!(
                "API key might be invalid or unauthorized for {}",
                self.model
            );
            StudioError::Generation(format!(
                "Failed to generate images. Please check your API key and ensure it has access to the '{}' model. Original error: {message}",
                self.model
            ))
        } else {
            StudioError::Generation(format!("Failed to generate images: {message}"))
        }
    }

    async fn predict(
        &self,
        api_key: &str,
        request: &GenerationRequest,
        reference: Option<&DataUrl>,
    ) -> Result<Vec<String>, CallFailure> {
        let body = PredictRequest {
            instances: [PredictInstance {
                prompt: &request.prompt,
                image: reference.map(|image| InlineImage {
                    bytes_base64_encoded: image.base64_payload(),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: PredictParameters {
                sample_count: BATCH_SIZE,
                aspect_ratio: request.aspect_ratio.token(),
                output_options: OutputOptions {
                    mime_type: OUTPUT_MIME_TYPE,
                },
            },
        };
        debug!(
            "Requesting {} images from {} at {} (reference: {})",
            BATCH_SIZE,
            self.model,
            request.aspect_ratio,
            reference.is_some()
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| CallFailure::Upstream(err.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| CallFailure::Upstream(err.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(envelope) => {
                    debug!(
                        "Provider error status {}: {:?}",
                        status, envelope.error.status
                    );
                    envelope.error.message
                }
                Err(_) => format!("{status}: {}", String::from_utf8_lossy(&bytes)),
            };
            return Err(CallFailure::Upstream(message));
        }

        let parsed: PredictResponse = serde_json::from_slice(&bytes).map_err(|err| {
            CallFailure::Upstream(format!("Failed to parse predict response: {err}"))
        })?;

        let images: Vec<String> = parsed
            .predictions
            .into_iter()
            .filter_map(|prediction| {
                let payload = prediction.bytes_base64_encoded?;
                let mime_type = prediction
                    .mime_type
                    .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string());
                Some(format!("data:{mime_type};base64,{payload}"))
            })
            .collect();

        if images.is_empty() {
            return Err(CallFailure::NoImages);
        }
        Ok(images)
    }
}

impl ImageGenerator for ImagenClient {
    fn generate<'a>(&'a self, request: &'a GenerationRequest) -> GenerateFuture<'a> {
        Box::pin(self.generate_images(request))
    }
}
