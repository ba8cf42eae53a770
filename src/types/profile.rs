use serde::{Deserialize, Serialize};

pub const DEFAULT_FILTER_CUTOFF: f64 = 0.01;

/// Explicit configuration record for one pipeline run.
///
/// The cutoff is normalized to the Nyquist frequency and must lie in
/// (0.0, 0.5). 0.01 suits cycling tracks; walking/running tracks, where
/// elevation changes more per sample, want something like 0.05.
#[derive(Debug, Clone, Copy)]
pub struct ProfileOptions {
    pub filter_cutoff: f64,
    pub compute_heart_rate: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            filter_cutoff: DEFAULT_FILTER_CUTOFF,
            compute_heart_rate: false,
        }
    }
}

impl ProfileOptions {
    pub fn cutoff_is_valid(&self) -> bool {
        self.filter_cutoff.is_finite() && self.filter_cutoff > 0.0 && self.filter_cutoff < 0.5
    }
}

/// Geometry of the rendered profile chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            padding: 70,
        }
    }
}

/// PNG output geometry and background fill.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    /// RGBA fill behind the chart; None keeps the PNG transparent.
    pub background: Option<(u8, u8, u8, u8)>,
}

/// One maximal monotonic climb or descent of the smoothed elevation.
/// Indices refer to the per-point elevation series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start_index: usize,
    pub end_index: usize,
    pub total_distance_m: f64,
    pub elevation_delta_m: f64,
    pub grade_percent: f64,
    /// NaN (JSON null) when no heart-rate samples fall in the segment.
    pub avg_heart_rate: f64,
}

/// Final output bundle of one pipeline run.
///
/// `cumulative_distance_km`, `elevation_raw` and `elevation_filtered`
/// carry one entry per track point; the stepped series carry one entry
/// per interval between points, i.e. one entry fewer. NaN entries
/// serialize as JSON null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeProfile {
    pub cumulative_distance_km: Vec<f64>,
    pub elevation_raw: Vec<f64>,
    pub elevation_filtered: Vec<f64>,
    pub stepped_grade: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stepped_avg_heart_rate: Option<Vec<f64>>,
    pub segments: Vec<Segment>,
}
