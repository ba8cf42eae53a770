use std::f64::consts::PI;

use sci_rs::signal::filter::{design::Sos, sosfiltfilt_dyn};

use crate::error::ProfileError;
use crate::types::activity::TrackPoint;

/// Per-point elevation with gaps forward-filled from the last known
/// value. A track whose first point has no elevation has nothing to
/// carry forward and fails.
pub fn raw_series(points: &[TrackPoint]) -> Result<Vec<f64>, ProfileError> {
    let mut series = Vec::with_capacity(points.len());
    let mut last = None;

    for point in points {
        let value = point
            .elevation
            .or(last)
            .ok_or(ProfileError::NoElevationData)?;
        series.push(value);
        last = Some(value);
    }

    Ok(series)
}

/// Fifth-order Butterworth low-pass, applied forward and backward so
/// the output is not shifted against the input. `cutoff` is normalized
/// to the Nyquist frequency and must lie in (0.0, 0.5).
pub fn smoothed_series(raw: &[f64], cutoff: f64) -> Result<Vec<f64>, ProfileError> {
    if !(cutoff.is_finite() && cutoff > 0.0 && cutoff < 0.5) {
        return Err(ProfileError::Filter(format!(
            "cutoff {} outside (0.0, 0.5)",
            cutoff
        )));
    }
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(ProfileError::Filter(
            "non-finite elevation value".to_string(),
        ));
    }

    let sections = butterworth_lowpass(cutoff);

    // Zero-phase filtering pads the series at both ends with three taps
    // per coefficient; anything shorter stays unfiltered.
    if raw.len() <= 3 * (2 * sections.len() + 1) {
        return Ok(raw.to_vec());
    }

    let filtered: Vec<f64> = sosfiltfilt_dyn(raw.iter(), &sections);
    if filtered.len() != raw.len() || filtered.iter().any(|v| !v.is_finite()) {
        return Err(ProfileError::Filter(
            "numerically degenerate filter output".to_string(),
        ));
    }

    Ok(filtered)
}

/// Fifth-order Butterworth prototype mapped through the bilinear
/// transform, section by section: conjugate pole pairs at 108 and 144
/// degrees become unity-gain low-pass biquads, the real pole a
/// first-order section.
fn butterworth_lowpass(cutoff: f64) -> Vec<Sos<f64>> {
    let w0 = PI * cutoff;
    let (sin_w0, cos_w0) = w0.sin_cos();

    let pair_dampings = [(PI / 5.0).cos(), (2.0 * PI / 5.0).cos()];

    let mut sections = Vec::with_capacity(pair_dampings.len() + 1);
    for zeta in pair_dampings {
        let alpha = sin_w0 * zeta;
        let a0 = 1.0 + alpha;
        let b1 = (1.0 - cos_w0) / a0;
        sections.push(Sos::new(
            [b1 / 2.0, b1, b1 / 2.0],
            [1.0, -2.0 * cos_w0 / a0, (1.0 - alpha) / a0],
        ));
    }

    let k = (w0 / 2.0).tan();
    let b0 = k / (k + 1.0);
    sections.push(Sos::new([b0, b0, 0.0], [1.0, (k - 1.0) / (k + 1.0), 0.0]));

    sections
}
