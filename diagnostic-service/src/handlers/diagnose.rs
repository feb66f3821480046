use crate::config::ImageMode;
use crate::dtos::{AnalyzeJobRequest, AnalyzeJobResponse, ImageAnalysisResponse};
use crate::extract::extract_fields;
use crate::prompt;
use crate::services::providers::{ChatRequest, ImageInput, ProviderError};
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::startup::AppState;

/// Uploads above this size are rejected outright. The router's body limit is
/// sized from this, so the check here is what callers actually hit.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// `POST /analyze-job`: build the diagnostic prompt from the JSON body,
/// run it through the chat model and hand back the trimmed reply.
pub async fn analyze_job(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let chat_request = ChatRequest {
        prompt: prompt::build_job_prompt(&request),
        image: None,
        max_tokens: state.config.models.max_output_tokens,
    };

    let outcome = state
        .provider
        .complete(&chat_request)
        .await
        .map_err(provider_error)?;

    tracing::info!(
        input_tokens = outcome.input_tokens,
        output_tokens = outcome.output_tokens,
        finish_reason = ?outcome.finish_reason,
        "Job analysis completed"
    );

    Ok(Json(AnalyzeJobResponse {
        result: outcome.text,
    }))
}

/// `POST /analyze-image`: multipart upload of a cluster/scan-tool photo plus
/// optional registration and notes fields. The reply is scraped for
/// VIN/DTC/live-data guesses; `summary` carries the model's own words.
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut image: Option<(String, String, Vec<u8>)> = None;
    let mut registration: Option<String> = None;
    let mut notes: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        match field.name().unwrap_or_default() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                })?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Image too large (max 20MB)"
                    )));
                }
                image = Some((file_name, mime_type, data.to_vec()));
            }
            "registration" => {
                registration = field.text().await.ok();
            }
            "notes" => {
                notes = field.text().await.ok();
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, mime_type, data) = image
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No image file uploaded")))?;

    let image_input = match state.config.storage.image_mode {
        ImageMode::Inline => ImageInput::Inline { mime_type, data },
        ImageMode::Url => {
            let stored = state.images.save(&file_name, data).await?;
            ImageInput::Url(format!(
                "{}/static/{}",
                state.config.storage.public_base_url.trim_end_matches('/'),
                stored.file_name
            ))
        }
    };

    let chat_request = ChatRequest {
        prompt: prompt::build_image_prompt(registration.as_deref(), notes.as_deref()),
        image: Some(image_input),
        max_tokens: state.config.models.max_output_tokens,
    };

    let outcome = state
        .provider
        .complete(&chat_request)
        .await
        .map_err(provider_error)?;

    let fields = extract_fields(&outcome.text);

    tracing::info!(
        vin_found = fields.vin.is_some(),
        dtc_count = fields.dtcs.len(),
        finish_reason = ?outcome.finish_reason,
        "Image analysis completed"
    );

    Ok(Json(ImageAnalysisResponse::new(fields, outcome.text)))
}

/// Map provider failures onto the response taxonomy.
fn provider_error(error: ProviderError) -> AppError {
    match error {
        ProviderError::NotConfigured(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
        ProviderError::InvalidRequest(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
        ProviderError::ContentFiltered => AppError::BadRequest(anyhow::anyhow!(
            "Content was filtered by the AI provider safety settings"
        )),
        ProviderError::RateLimited => {
            AppError::BadGateway("Rate limited by AI provider".to_string())
        }
        ProviderError::ApiError(msg) | ProviderError::NetworkError(msg) => {
            AppError::BadGateway(msg)
        }
    }
}
