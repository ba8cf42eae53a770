use crate::error::ProfileError;
use crate::pipeline::{distance, elevation, segment};
use crate::types::activity::TrackPoint;
use crate::types::profile::{GradeProfile, ProfileOptions, Segment};

/// Runs the whole pipeline over one track: distances, conditioned
/// elevation, segment boundaries, per-segment aggregation, and the
/// assembled output bundle. Fails outright on the first hard error;
/// nothing partial is returned.
pub fn build_profile(
    points: &[TrackPoint],
    options: &ProfileOptions,
) -> Result<GradeProfile, ProfileError> {
    let distances = distance::distance_series(points)?;
    let raw = elevation::raw_series(points)?;
    let filtered = elevation::smoothed_series(&raw, options.filter_cutoff)?;
    let boundaries = segment::segment_boundaries(&filtered);

    let aggregated = aggregate(points, &distances, &raw, &boundaries, options.compute_heart_rate);

    Ok(GradeProfile {
        cumulative_distance_km: cumulative_km(&distances),
        elevation_raw: raw,
        elevation_filtered: filtered,
        stepped_grade: aggregated.stepped_grade,
        stepped_avg_heart_rate: aggregated.stepped_avg_heart_rate,
        segments: aggregated.segments,
    })
}

struct Aggregation {
    segments: Vec<Segment>,
    stepped_grade: Vec<f64>,
    stepped_avg_heart_rate: Option<Vec<f64>>,
}

/// For each boundary pair `(start, end)`: distance sum over
/// `[start, end)`, elevation delta from the raw series, grade with a
/// mandatory zero-distance guard, and the heart-rate mean over the
/// points of the half-open range (NaN when no samples exist). Each
/// scalar is broadcast over the segment's `end - start` intervals.
fn aggregate(
    points: &[TrackPoint],
    distances: &[f64],
    raw: &[f64],
    boundaries: &[usize],
    compute_heart_rate: bool,
) -> Aggregation {
    let interval_count = raw.len().saturating_sub(1);
    let mut segments = Vec::with_capacity(boundaries.len().saturating_sub(1));
    let mut stepped_grade = Vec::with_capacity(interval_count);
    let mut stepped_avg_heart_rate =
        compute_heart_rate.then(|| Vec::with_capacity(interval_count));

    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1]);

        let total_distance: f64 = distances[start..end].iter().sum();
        let elevation_delta = raw[end] - raw[start];
        let grade_percent = if total_distance == 0.0 {
            0.0
        } else {
            elevation_delta / total_distance * 100.0
        };
        let avg_heart_rate = mean_heart_rate(&points[start..end]);

        stepped_grade.extend(std::iter::repeat(grade_percent).take(end - start));
        if let Some(stepped) = stepped_avg_heart_rate.as_mut() {
            stepped.extend(std::iter::repeat(avg_heart_rate).take(end - start));
        }

        segments.push(Segment {
            start_index: start,
            end_index: end,
            total_distance_m: total_distance,
            elevation_delta_m: elevation_delta,
            grade_percent,
            avg_heart_rate,
        });
    }

    Aggregation {
        segments,
        stepped_grade,
        stepped_avg_heart_rate,
    }
}

fn mean_heart_rate(points: &[TrackPoint]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for point in points {
        if let Some(hr) = point.heart_rate {
            sum += hr as f64;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Running distance sum in kilometers, one entry per track point; the
/// first point sits at 0.0.
fn cumulative_km(distances: &[f64]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(distances.len() + 1);
    cumulative.push(0.0);
    let mut sum = 0.0;
    for d in distances {
        sum += d;
        cumulative.push(sum / 1000.0);
    }
    cumulative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(elevation: f64, heart_rate: Option<u16>) -> TrackPoint {
        TrackPoint {
            lat: 0.0,
            lon: 0.0,
            elevation: Some(elevation),
            time: None,
            heart_rate,
        }
    }

    fn track(elevations: &[f64]) -> Vec<TrackPoint> {
        // Points spaced roughly 111 m apart along a meridian.
        elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackPoint {
                lat: i as f64 * 0.001,
                lon: 0.0,
                elevation: Some(e),
                time: None,
                heart_rate: None,
            })
            .collect()
    }

    #[test]
    fn flat_track_is_one_zero_grade_segment() {
        let elevations = [100.0, 100.0, 100.0, 100.0, 100.0];
        let points = track(&elevations);
        let boundaries = [0, 4];
        let distances = [100.0, 100.0, 100.0, 100.0];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, false);
        assert_eq!(agg.segments.len(), 1);
        assert_eq!(agg.segments[0].grade_percent, 0.0);
        assert_eq!(agg.stepped_grade, vec![0.0; 4]);
        assert!(agg.stepped_avg_heart_rate.is_none());
    }

    #[test]
    fn single_climb_aggregates_to_ten_percent() {
        let elevations = [100.0, 110.0, 120.0, 130.0, 140.0];
        let points = track(&elevations);
        let boundaries = [0, 4];
        let distances = [100.0, 100.0, 100.0, 100.0];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, false);
        assert_eq!(agg.segments.len(), 1);
        let segment = &agg.segments[0];
        assert_eq!(segment.total_distance_m, 400.0);
        assert_eq!(segment.elevation_delta_m, 40.0);
        assert!((segment.grade_percent - 10.0).abs() < 1e-9);
        assert_eq!(agg.stepped_grade.len(), 4);
    }

    #[test]
    fn climb_then_descent_yields_opposite_grades() {
        let elevations = [100.0, 150.0, 100.0];
        let points = track(&elevations);
        let boundaries = [0, 1, 2];
        let distances = [500.0, 500.0];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, false);
        assert_eq!(agg.segments.len(), 2);
        assert!((agg.segments[0].grade_percent - 10.0).abs() < 1e-9);
        assert!((agg.segments[1].grade_percent + 10.0).abs() < 1e-9);
        assert_eq!(agg.stepped_grade.len(), 2);
    }

    #[test]
    fn zero_distance_segment_has_zero_grade() {
        let elevations = [100.0, 150.0, 100.0];
        let points = track(&elevations);
        let boundaries = [0, 1, 2];
        let distances = [0.0, 0.0];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, false);
        assert!(agg.stepped_grade.iter().all(|&g| g == 0.0));
        assert!(agg.segments.iter().all(|s| s.grade_percent.is_finite()));
    }

    #[test]
    fn heart_rate_mean_skips_absent_samples() {
        let points = vec![
            point(100.0, Some(100)),
            point(101.0, None),
            point(102.0, Some(120)),
            point(103.0, Some(140)),
        ];
        let distances = [10.0, 10.0, 10.0];
        let elevations = [100.0, 101.0, 102.0, 103.0];
        let boundaries = [0, 3];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, true);
        let stepped = agg.stepped_avg_heart_rate.expect("heart rate requested");
        // Mean over points [0, 3): 100 and 120.
        assert_eq!(stepped, vec![110.0, 110.0, 110.0]);
    }

    #[test]
    fn missing_heart_rate_propagates_nan_instead_of_failing() {
        let elevations = [100.0, 110.0, 120.0];
        let points = track(&elevations);
        let distances = [100.0, 100.0];
        let boundaries = [0, 2];

        let agg = aggregate(&points, &distances, &elevations, &boundaries, true);
        let stepped = agg.stepped_avg_heart_rate.expect("heart rate requested");
        assert_eq!(stepped.len(), 2);
        assert!(stepped.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn full_pipeline_respects_length_invariants() {
        let elevations: Vec<f64> = (0..40).map(|i| 500.0 + (i as f64 * 0.5).sin() * 20.0).collect();
        let points = track(&elevations);
        let options = ProfileOptions {
            compute_heart_rate: true,
            ..Default::default()
        };

        let profile = build_profile(&points, &options).expect("profile");
        let n = points.len();
        assert_eq!(profile.elevation_raw.len(), n);
        assert_eq!(profile.elevation_filtered.len(), n);
        assert_eq!(profile.cumulative_distance_km.len(), n);
        assert_eq!(profile.stepped_grade.len(), n - 1);
        assert_eq!(
            profile.stepped_avg_heart_rate.expect("requested").len(),
            n - 1
        );

        let covered: usize = profile
            .segments
            .iter()
            .map(|s| s.end_index - s.start_index)
            .sum();
        assert_eq!(covered, n - 1);
        assert_eq!(profile.segments.first().expect("segments").start_index, 0);
        assert_eq!(profile.segments.last().expect("segments").end_index, n - 1);
    }

    #[test]
    fn cumulative_distance_starts_at_zero_and_is_monotonic() {
        let cumulative = cumulative_km(&[100.0, 0.0, 250.0]);
        assert_eq!(cumulative.len(), 4);
        assert_eq!(cumulative[0], 0.0);
        assert!(cumulative.windows(2).all(|w| w[1] >= w[0]));
        assert!((cumulative[3] - 0.35).abs() < 1e-12);
    }

    #[test]
    fn pipeline_output_is_bit_identical_across_runs() {
        let elevations: Vec<f64> = (0..60)
            .map(|i| 800.0 + (i as f64 * 0.3).sin() * 15.0 + (i as f64 * 1.9).sin() * 2.0)
            .collect();
        let points = track(&elevations);
        let options = ProfileOptions::default();

        let a = build_profile(&points, &options).expect("first");
        let b = build_profile(&points, &options).expect("second");

        let bits = |v: &[f64]| -> Vec<u64> { v.iter().map(|x| x.to_bits()).collect() };
        assert_eq!(bits(&a.stepped_grade), bits(&b.stepped_grade));
        assert_eq!(bits(&a.elevation_filtered), bits(&b.elevation_filtered));
        assert_eq!(
            bits(&a.cumulative_distance_km),
            bits(&b.cumulative_distance_km)
        );
    }
}
