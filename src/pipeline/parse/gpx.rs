use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{FileFormat, ParsedActivity, TrackPoint};
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Streaming GPX reader. Only the first `<trk>`/`<trkseg>` is read;
/// the heart-rate extension tag is matched by suffix so namespaced
/// variants (`gpxtpx:hr`, `ns3:hr`) all resolve.
pub struct GpxParser;

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut points = Vec::new();
        let mut track_count = 0usize;
        let mut segment_count = 0usize;
        let mut in_trkpt = false;
        let mut current_point: Option<TrackPoint> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    match name_str {
                        "trk" => track_count += 1,
                        "trkseg" if track_count == 1 => segment_count += 1,
                        "trkpt" if track_count == 1 && segment_count == 1 => {
                            in_trkpt = true;
                            current_point = point_from_attributes(&e)?;
                        }
                        _ if in_trkpt => current_element = name_str.to_string(),
                        _ => {}
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    // A self-closing trkpt has no child elements and no
                    // closing tag, so it is complete right here.
                    if name_str == "trkpt" && track_count == 1 && segment_count == 1 {
                        if let Some(point) = point_from_attributes(&e)? {
                            points.push(point);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_trkpt {
                        if let Some(point) = current_point.as_mut() {
                            let text = e
                                .unescape()
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                            match current_element.as_str() {
                                "ele" => point.elevation = text.parse().ok(),
                                "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                                tag if tag == "hr" || tag.ends_with(":hr") => {
                                    point.heart_rate = text.parse().ok()
                                }
                                _ => {}
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" && in_trkpt {
                        if let Some(point) = current_point.take() {
                            points.push(point);
                        }
                        in_trkpt = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if points.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedActivity {
            points,
            file_format: FileFormat::Gpx,
        })
    }
}

fn point_from_attributes(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<Option<TrackPoint>, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match key {
            "lat" => lat = value.parse().ok(),
            "lon" => lon = value.parse().ok(),
            _ => {}
        }
    }

    Ok(match (lat, lon) {
        (Some(lat), Some(lon)) => Some(TrackPoint {
            lat,
            lon,
            elevation: None,
            time: None,
            heart_rate: None,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TRACK_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="47.0" lon="11.0"><ele>500.0</ele><extensions><gpxtpx:hr>120</gpxtpx:hr></extensions></trkpt>
    <trkpt lat="47.001" lon="11.0"><ele>510.0</ele><extensions><gpxtpx:hr>130</gpxtpx:hr></extensions></trkpt>
  </trkseg><trkseg>
    <trkpt lat="48.0" lon="11.0"><ele>900.0</ele></trkpt>
  </trkseg></trk>
  <trk><trkseg>
    <trkpt lat="49.0" lon="11.0"><ele>100.0</ele></trkpt>
  </trkseg></trk>
</gpx>"#;

    #[test]
    fn reads_only_first_track_segment() {
        let parsed = GpxParser.parse(TWO_TRACK_GPX.as_bytes()).expect("parse");
        assert_eq!(parsed.points.len(), 2);
        assert_eq!(parsed.points[0].elevation, Some(500.0));
        assert_eq!(parsed.points[1].heart_rate, Some(130));
    }

    #[test]
    fn heart_rate_tag_matches_by_suffix() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="1.0" lon="2.0"><ele>3.0</ele><extensions><ns3:hr>99</ns3:hr></extensions></trkpt>
        </trkseg></trk></gpx>"#;
        let parsed = GpxParser.parse(gpx.as_bytes()).expect("parse");
        assert_eq!(parsed.points[0].heart_rate, Some(99));
    }

    #[test]
    fn self_closing_trkpt_is_kept() {
        let gpx = r#"<gpx><trk><trkseg>
            <trkpt lat="47.0" lon="11.0"/>
            <trkpt lat="47.001" lon="11.0"><ele>510.0</ele></trkpt>
        </trkseg></trk></gpx>"#;
        let parsed = GpxParser.parse(gpx.as_bytes()).expect("parse");
        assert_eq!(parsed.points.len(), 2);
        assert_eq!(parsed.points[0].lat, 47.0);
        assert_eq!(parsed.points[0].elevation, None);
        assert_eq!(parsed.points[1].elevation, Some(510.0));
    }

    #[test]
    fn empty_file_is_rejected() {
        let gpx = r#"<gpx><trk><trkseg></trkseg></trk></gpx>"#;
        assert!(matches!(
            GpxParser.parse(gpx.as_bytes()),
            Err(ParseError::EmptyFile)
        ));
    }
}
