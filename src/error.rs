use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("Gemini API error ({status}): {body}")]
    GeminiApi { status: u16, body: String },
    #[error("Gemini returned no text candidates")]
    EmptyCompletion,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
