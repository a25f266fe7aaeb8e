use hyper::StatusCode;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Everything the upload pipeline can reject a request with. Each
/// variant maps to one HTTP status, so validation failures, engine
/// failures, and server faults stay distinguishable to the caller.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid filename '{filename}': only .parquet uploads are accepted")]
    InvalidExtension { filename: String },

    #[error("upload exceeds the {limit} byte ceiling")]
    TooLarge { limit: u64 },

    #[error("request body is not multipart/form-data")]
    NotMultipart,

    #[error("multipart field 'file' is missing")]
    MissingFile,

    #[error("uploaded file has no filename")]
    MissingFilename,

    #[error("malformed multipart payload: {0}")]
    Multipart(String),

    #[error("could not read uploaded file: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::InvalidExtension { .. }
            | UploadError::NotMultipart
            | UploadError::MissingFile
            | UploadError::MissingFilename
            | UploadError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UploadError::Io(_) | UploadError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn log(&self) {
        match self {
            UploadError::Io(_) | UploadError::Internal(_) => error!("upload failed: {self}"),
            UploadError::Engine(_) => warn!("upload rejected by engine: {self}"),
            _ => debug!("upload rejected: {self}"),
        }
    }
}

impl From<crate::engine::EngineError> for UploadError {
    fn from(e: crate::engine::EngineError) -> Self {
        match e {
            crate::engine::EngineError::Duck(err) => UploadError::Engine(err.to_string()),
            crate::engine::EngineError::Io(err) => UploadError::Io(err),
            crate::engine::EngineError::NonUtf8Path => {
                UploadError::Internal("scratch path is not valid UTF-8".to_string())
            }
        }
    }
}
