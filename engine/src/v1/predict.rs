use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::pipeline::{self, Label};
use crate::AppState;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Label,
}

pub async fn predict(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let request_id = Uuid::new_v4();
    let bytes = read_file_field(multipart?).await?;
    tracing::debug!(%request_id, size = bytes.len(), "Received upload");

    let classifier = state.classifier.clone();
    let classification =
        tokio::task::spawn_blocking(move || pipeline::predict(classifier.as_ref(), &bytes))
            .await??;

    tracing::info!(
        %request_id,
        probability = classification.probability,
        "Prediction: {}",
        classification.label
    );

    Ok((
        StatusCode::OK,
        Json(PredictResponse {
            prediction: classification.label,
        }),
    ))
}

/// Pulls the single `file` part out of the form. Other fields are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<Bytes> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if file.is_some() {
            return Err(Error::DuplicateFile);
        }
        file = Some(field.bytes().await?);
    }

    file.ok_or(Error::MissingFile)
}
