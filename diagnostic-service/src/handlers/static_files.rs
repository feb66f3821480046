use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use service_core::error::AppError;

/// `GET /static/:filename`: raw bytes of a previously uploaded image.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let data = state.images.load(&file_name).await?;
    let content_type = content_type_for(&file_name);
    Ok(([(header::CONTENT_TYPE, content_type)], data))
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
