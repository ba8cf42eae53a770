use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::{parse, process};
use crate::state::{AppState, StoredActivity};
use crate::types::activity::{Availability, FileFormat, Metrics};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize, Deserialize)]
struct UploadResponse {
    file_id: String,
    file_type: String,
    point_count: usize,
    metrics: Metrics,
    availability: Availability,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            file_bytes = Some(field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let format = FileFormat::from_filename(&filename)
        .ok_or_else(|| AppError::BadRequest("Unsupported file format".to_string()))?;

    tracing::info!("Parsing {} file: {}", format.as_str(), filename);

    let activity = parse::parse(&bytes, format)?;
    let (metrics, availability) = process::summarize(&activity.points);
    let point_count = activity.points.len();

    let file_id = Uuid::new_v4().to_string();
    state.insert(
        file_id.clone(),
        StoredActivity {
            activity,
            metrics: metrics.clone(),
            availability: availability.clone(),
        },
    );

    tracing::info!(
        "Uploaded file {} with ID {} ({} points, {:.2} km)",
        filename,
        file_id,
        point_count,
        metrics.distance_km
    );

    Ok(Json(UploadResponse {
        file_id,
        file_type: format.as_str().to_string(),
        point_count,
        metrics,
        availability,
    }))
}
