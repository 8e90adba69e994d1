use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("export payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("export payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
