use std::path::PathBuf;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Uploaded file is not a decodable image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Uploaded image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Missing multipart field 'file'")]
    MissingFile,

    #[error("Expected exactly one multipart field 'file'")]
    DuplicateFile,

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Expected a multipart/form-data body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("Failed to load checkpoint {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },

    #[error("Inference error: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("Model produced an unusable output: {0}")]
    InvalidOutput(String),

    #[error("Inference task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Decode(_) | Error::EmptyImage { .. } | Error::DuplicateFile => {
                StatusCode::BAD_REQUEST
            }
            Error::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Multipart(err) => err.status(),
            Error::NotMultipart(rejection) => rejection.status(),
            Error::ModelLoad { .. }
            | Error::Inference(_)
            | Error::InvalidOutput(_)
            | Error::TaskJoin(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Prediction request failed");
        } else {
            tracing::warn!(error = %self, "Rejected prediction request");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
