use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::{build_profile, rasterize, render};
use crate::state::AppState;
use crate::types::profile::{ChartOptions, ProfileOptions, RasterConfig, DEFAULT_FILTER_CUTOFF};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", post(profile))
}

#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct ProfileRequest {
    file_id: String,
    #[serde(default = "default_cutoff")]
    filter_cutoff: f64,
    #[serde(default)]
    compute_heart_rate: bool,
    width: Option<u32>,
    height: Option<u32>,
    background: Option<String>,
    #[serde(default)]
    format: OutputFormat,
}

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    #[default]
    Json,
    Png,
}

fn default_cutoff() -> f64 {
    DEFAULT_FILTER_CUTOFF
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), AppError> {
    const MIN_DIM: u32 = 320;
    const MAX_DIM: u32 = 4096;
    const MAX_MEGAPIXELS: f64 = 10.0;

    if !(MIN_DIM..=MAX_DIM).contains(&width) || !(MIN_DIM..=MAX_DIM).contains(&height) {
        return Err(AppError::BadRequest(format!(
            "Invalid dimensions: {}x{}. Width/height must be between {} and {}",
            width, height, MIN_DIM, MAX_DIM
        )));
    }

    let megapixels = (width as f64 * height as f64) / 1_000_000.0;
    if megapixels > MAX_MEGAPIXELS {
        return Err(AppError::BadRequest(format!(
            "Image too large: {}x{} ({:.2} MP). Max allowed is {:.1} MP",
            width, height, megapixels, MAX_MEGAPIXELS
        )));
    }

    Ok(())
}

async fn profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let stored = state
        .get(&req.file_id)
        .ok_or_else(|| AppError::NotFound(req.file_id.clone()))?;

    let options = ProfileOptions {
        filter_cutoff: req.filter_cutoff,
        compute_heart_rate: req.compute_heart_rate,
    };
    if !options.cutoff_is_valid() {
        return Err(AppError::BadRequest(format!(
            "Invalid filter_cutoff: {}. Must lie strictly between 0.0 and 0.5",
            req.filter_cutoff
        )));
    }

    let mut chart = ChartOptions::default();
    match (req.width, req.height) {
        (Some(width), Some(height)) => {
            validate_dimensions(width, height)?;
            chart.width = width;
            chart.height = height;
        }
        (None, None) => {}
        _ => {
            return Err(AppError::BadRequest(
                "Both width and height must be provided together".to_string(),
            ))
        }
    }

    let background = match req.background.as_deref() {
        Some("white") => Some((255, 255, 255, 255)),
        Some("black") => Some((0, 0, 0, 255)),
        Some("transparent") | None => None,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Invalid background: {}. Use 'transparent', 'white', or 'black'",
                other
            )));
        }
    };

    tracing::info!(
        "Building grade profile for file {} (cutoff: {}, heart rate: {}, format: {:?})",
        req.file_id,
        options.filter_cutoff,
        options.compute_heart_rate,
        req.format
    );

    let grade_profile = build_profile(&stored.activity.points, &options)?;

    match req.format {
        OutputFormat::Json => Ok(Json(grade_profile).into_response()),
        OutputFormat::Png => {
            let svg = render::render_chart(&grade_profile, &chart)?;
            let config = RasterConfig {
                width: chart.width,
                height: chart.height,
                background,
            };
            let image_bytes = rasterize::rasterize(&svg, &config)?;

            tracing::info!("Generated PNG: {} bytes", image_bytes.len());

            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "image/png")],
                image_bytes,
            )
                .into_response())
        }
    }
}
