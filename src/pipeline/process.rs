use crate::pipeline::distance::haversine_m;
use crate::types::activity::{Availability, Metrics, TrackPoint};

/// Ride-level summary shown after upload, independent of any profile
/// options the client may pick later.
pub fn summarize(points: &[TrackPoint]) -> (Metrics, Availability) {
    let mut distance_m = 0.0;
    let mut elevation_gain_m = 0.0;
    let mut duration_seconds = 0u64;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        distance_m += haversine_m(prev.lat, prev.lon, curr.lat, curr.lon);

        if let (Some(prev_ele), Some(curr_ele)) = (prev.elevation, curr.elevation) {
            let gain = curr_ele - prev_ele;
            if gain > 0.0 {
                elevation_gain_m += gain;
            }
        }

        if let (Some(prev_time), Some(curr_time)) = (prev.time, curr.time) {
            duration_seconds += (curr_time - prev_time).num_seconds().max(0) as u64;
        }
    }

    let mut hr_sum = 0u64;
    let mut hr_count = 0u64;
    let mut max_hr = 0u16;
    for hr in points.iter().filter_map(|p| p.heart_rate) {
        hr_sum += hr as u64;
        hr_count += 1;
        max_hr = max_hr.max(hr);
    }

    let metrics = Metrics {
        distance_km: distance_m / 1000.0,
        elevation_gain_m,
        duration_seconds,
        avg_heart_rate: (hr_count > 0).then(|| (hr_sum / hr_count) as u16),
        max_heart_rate: (max_hr > 0).then_some(max_hr),
    };

    let availability = Availability {
        has_coordinates: points.iter().any(|p| p.lat != 0.0 || p.lon != 0.0),
        has_elevation: points.iter().any(|p| p.elevation.is_some()),
        has_heart_rate: points.iter().any(|p| p.heart_rate.is_some()),
    };

    (metrics, availability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn summary_covers_distance_gain_and_heart_rate() {
        let points: Vec<TrackPoint> = (0..3)
            .map(|i| TrackPoint {
                lat: i as f64 * 0.001,
                lon: 0.0,
                elevation: Some(100.0 + i as f64 * 10.0),
                time: Utc.timestamp_opt(1_700_000_000 + i as i64 * 10, 0).single(),
                heart_rate: Some(130 + i as u16 * 10),
            })
            .collect();

        let (metrics, availability) = summarize(&points);
        assert!(metrics.distance_km > 0.2 && metrics.distance_km < 0.25);
        assert_eq!(metrics.elevation_gain_m, 20.0);
        assert_eq!(metrics.duration_seconds, 20);
        assert_eq!(metrics.avg_heart_rate, Some(140));
        assert_eq!(metrics.max_heart_rate, Some(150));
        assert!(availability.has_coordinates);
        assert!(availability.has_elevation);
        assert!(availability.has_heart_rate);
    }

    #[test]
    fn absent_fields_are_reported_unavailable() {
        let points = vec![
            TrackPoint {
                lat: 1.0,
                lon: 2.0,
                elevation: None,
                time: None,
                heart_rate: None,
            };
            2
        ];
        let (metrics, availability) = summarize(&points);
        assert_eq!(metrics.avg_heart_rate, None);
        assert!(!availability.has_elevation);
        assert!(!availability.has_heart_rate);
    }
}
