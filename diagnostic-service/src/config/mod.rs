use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Output-token budget handed to the chat API. The deployed revisions of
/// this service used 500-1000 depending on prompt size.
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiApiConfig,
    pub models: ModelConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiApiConfig {
    pub api_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model for the text diagnosis path (e.g. gpt-4-turbo).
    pub text_model: String,
    /// Model for the image extraction path (e.g. gpt-4o).
    pub vision_model: String,
    /// Maximum output tokens per completion.
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded images are written to.
    pub local_path: String,
    /// Base URL prepended to `/static/<file>` when sending image URLs upstream.
    pub public_base_url: String,
    /// Uploaded images older than this are pruned.
    pub retention_hours: i64,
    /// How uploaded images reach the model.
    pub image_mode: ImageMode,
}

/// How an uploaded image is handed to the chat API: embedded inline as a
/// base64 data URL, or persisted locally and referenced by public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    Inline,
    Url,
}

impl ImageMode {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value.to_ascii_lowercase().as_str() {
            "inline" => Ok(ImageMode::Inline),
            "url" => Ok(ImageMode::Url),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "IMAGE_MODE must be 'inline' or 'url', got '{}'",
                other
            ))),
        }
    }
}

impl DiagnosticConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(DiagnosticConfig {
            common: common_config,
            openai: OpenAiApiConfig {
                api_key: get_env("OPENAI_API_KEY", None, is_prod)?,
                api_base: get_env(
                    "OPENAI_API_BASE",
                    Some("https://api.openai.com/v1"),
                    is_prod,
                )?,
            },
            models: ModelConfig {
                text_model: get_env("DIAG_TEXT_MODEL", Some("gpt-4-turbo"), is_prod)?,
                vision_model: get_env("DIAG_VISION_MODEL", Some("gpt-4o"), is_prod)?,
                max_output_tokens: get_env(
                    "DIAG_MAX_OUTPUT_TOKENS",
                    Some(&DEFAULT_MAX_OUTPUT_TOKENS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            },
            storage: StorageConfig {
                local_path: get_env("UPLOAD_PATH", Some("./uploads"), is_prod)?,
                public_base_url: get_env(
                    "PUBLIC_BASE_URL",
                    Some("http://localhost:8080"),
                    is_prod,
                )?,
                retention_hours: get_env("UPLOAD_RETENTION_HOURS", Some("24"), is_prod)?
                    .parse()
                    .unwrap_or(24),
                image_mode: ImageMode::parse(&get_env("IMAGE_MODE", Some("inline"), is_prod)?)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
