use crate::error::ProfileError;
use crate::types::activity::TrackPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in meters between each consecutive point
/// pair. Entry `i` spans points `i` -> `i + 1`, so the result is one
/// entry shorter than the track.
pub fn distance_series(points: &[TrackPoint]) -> Result<Vec<f64>, ProfileError> {
    if points.len() < 2 {
        return Err(ProfileError::InsufficientPoints(points.len()));
    }

    Ok(points
        .windows(2)
        .map(|pair| haversine_m(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .collect())
}

pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}
