use crate::error::RenderError;
use crate::types::profile::{ChartOptions, GradeProfile};

const RAW_COLOR: &str = "#2F9E44";
const FILTERED_COLOR: &str = "#1C7ED6";
const GRADE_COLOR: &str = "#AE3EC9";
const HEART_RATE_COLOR: &str = "#E03131";
const GRID_COLOR: &str = "#CED4DA";
const TEXT_COLOR: &str = "#495057";
const FONT_FAMILY: &str = "DejaVu Sans, sans-serif";
const GRID_ROWS: usize = 5;
const GRID_COLUMNS: usize = 6;
const HEART_RATE_MAX_BPM: f64 = 230.0;

/// Linear value -> pixel mapping along one axis.
#[derive(Clone, Copy)]
struct Scale {
    domain_min: f64,
    domain_span: f64,
    range_min: f64,
    range_span: f64,
}

impl Scale {
    fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain_min: domain.0,
            domain_span: (domain.1 - domain.0).max(f64::EPSILON),
            range_min: range.0,
            range_span: range.1 - range.0,
        }
    }

    fn apply(&self, value: f64) -> f64 {
        self.range_min + (value - self.domain_min) / self.domain_span * self.range_span
    }

    fn domain_at(&self, t: f64) -> f64 {
        self.domain_min + self.domain_span * t
    }
}

/// Renders the grade profile as an SVG chart: raw and filtered
/// elevation against distance, the stepped grade on a secondary scale,
/// and a heart-rate panel below when the profile carries one.
pub fn render_chart(
    profile: &GradeProfile,
    options: &ChartOptions,
) -> Result<String, RenderError> {
    let x_values = &profile.cumulative_distance_km;
    if x_values.len() < 2 {
        return Err(RenderError::SvgError(
            "Not enough points for a profile chart".to_string(),
        ));
    }

    let width = options.width as f64;
    let height = options.height as f64;
    let padding = options.padding as f64;
    let inner_width = width - 2.0 * padding;
    let inner_height = height - 2.0 * padding;
    if inner_width <= 0.0 || inner_height <= 0.0 {
        return Err(RenderError::SvgError("Invalid viewport size".to_string()));
    }

    let with_heart_rate = profile.stepped_avg_heart_rate.is_some();
    let main_height = if with_heart_rate {
        inner_height * 0.58
    } else {
        inner_height
    };
    let main_top = padding;
    let main_bottom = main_top + main_height;

    let x_scale = Scale::new(
        (0.0, x_values.last().copied().unwrap_or(0.0)),
        (padding, padding + inner_width),
    );
    let elevation_scale = Scale::new(
        elevation_bounds(&profile.elevation_raw, &profile.elevation_filtered),
        (main_bottom, main_top),
    );
    let grade_scale = Scale::new(
        grade_bounds(&profile.stepped_grade),
        (main_bottom, main_top),
    );

    let mut body = String::new();
    body.push_str(&grid_and_axes(
        &x_scale,
        &elevation_scale,
        &grade_scale,
        main_top,
        main_bottom,
        padding,
        inner_width,
    ));
    body.push_str(&polyline(
        x_values,
        &profile.elevation_raw,
        &x_scale,
        &elevation_scale,
        RAW_COLOR,
        2.0,
    ));
    body.push_str(&polyline(
        x_values,
        &profile.elevation_filtered,
        &x_scale,
        &elevation_scale,
        FILTERED_COLOR,
        2.0,
    ));
    body.push_str(&step_path(
        x_values,
        &profile.stepped_grade,
        &x_scale,
        &grade_scale,
        GRADE_COLOR,
    ));
    body.push_str(&legend(padding + inner_width, main_top, with_heart_rate));

    if let Some(heart_rate) = profile.stepped_avg_heart_rate.as_deref() {
        let panel_top = main_bottom + inner_height * 0.12;
        let panel_bottom = padding + inner_height;
        let hr_scale = Scale::new((0.0, HEART_RATE_MAX_BPM), (panel_bottom, panel_top));
        body.push_str(&heart_rate_panel(
            x_values,
            heart_rate,
            &x_scale,
            &hr_scale,
            panel_top,
            panel_bottom,
            padding,
            inner_width,
        ));
    }

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
{body}</svg>"#,
        w = width,
        h = height,
        body = body
    ))
}

fn elevation_bounds(raw: &[f64], filtered: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in raw.iter().chain(filtered) {
        min = min.min(*v);
        max = max.max(*v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

fn grade_bounds(stepped_grade: &[f64]) -> (f64, f64) {
    let peak = stepped_grade
        .iter()
        .fold(0.0f64, |acc, g| acc.max(g.abs()))
        .max(1.0);
    (-peak * 1.1, peak * 1.1)
}

#[allow(clippy::too_many_arguments)]
fn grid_and_axes(
    x_scale: &Scale,
    elevation_scale: &Scale,
    grade_scale: &Scale,
    top: f64,
    bottom: f64,
    padding: f64,
    inner_width: f64,
) -> String {
    let mut out = String::new();
    let left = padding;
    let right = padding + inner_width;

    for row in 0..=GRID_ROWS {
        let t = row as f64 / GRID_ROWS as f64;
        let y = bottom - (bottom - top) * t;
        out.push_str(&format!(
            r#"<line x1="{left:.1}" y1="{y:.1}" x2="{right:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
        ));
        out.push_str(&text(
            left - 8.0,
            y + 4.0,
            "end",
            &format!("{:.0}", elevation_scale.domain_at(t)),
        ));
        out.push_str(&text(
            right + 8.0,
            y + 4.0,
            "start",
            &format!("{:.1}", grade_scale.domain_at(t)),
        ));
    }

    for column in 0..=GRID_COLUMNS {
        let t = column as f64 / GRID_COLUMNS as f64;
        let x = left + inner_width * t;
        out.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
        ));
        out.push_str(&text(
            x,
            bottom + 20.0,
            "middle",
            &format!("{:.1}", x_scale.domain_at(t)),
        ));
    }

    out.push_str(&axis_title(left - 48.0, (top + bottom) / 2.0, -90.0, "Elevation (m)"));
    out.push_str(&axis_title(right + 52.0, (top + bottom) / 2.0, 90.0, "Grade (%)"));
    out.push_str(&text(
        (left + right) / 2.0,
        bottom + 40.0,
        "middle",
        "Distance (km)",
    ));
    out
}

fn polyline(
    x_values: &[f64],
    y_values: &[f64],
    x_scale: &Scale,
    y_scale: &Scale,
    color: &str,
    stroke_width: f64,
) -> String {
    let mut path = String::new();
    for (i, (&x, &y)) in x_values.iter().zip(y_values).enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        path.push_str(&format!(
            "{} {:.2} {:.2} ",
            command,
            x_scale.apply(x),
            y_scale.apply(y)
        ));
    }
    format!(
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linejoin="round"/>"#,
        path.trim_end(),
        color,
        stroke_width
    )
}

/// Piecewise-constant path: each value spans the interval between two
/// consecutive x positions. NaN values break the path instead of
/// drawing.
fn step_path(
    x_values: &[f64],
    stepped: &[f64],
    x_scale: &Scale,
    y_scale: &Scale,
    color: &str,
) -> String {
    let mut path = String::new();
    let mut pen_down = false;

    for (i, &value) in stepped.iter().enumerate() {
        if !value.is_finite() {
            pen_down = false;
            continue;
        }
        let x0 = x_scale.apply(x_values[i]);
        let x1 = x_scale.apply(x_values[i + 1]);
        let y = y_scale.apply(value);
        if pen_down {
            path.push_str(&format!("L {:.2} {:.2} L {:.2} {:.2} ", x0, y, x1, y));
        } else {
            path.push_str(&format!("M {:.2} {:.2} L {:.2} {:.2} ", x0, y, x1, y));
            pen_down = true;
        }
    }

    if path.is_empty() {
        return String::new();
    }
    format!(
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="2.0"/>"#,
        path.trim_end(),
        color
    )
}

#[allow(clippy::too_many_arguments)]
fn heart_rate_panel(
    x_values: &[f64],
    heart_rate: &[f64],
    x_scale: &Scale,
    hr_scale: &Scale,
    top: f64,
    bottom: f64,
    padding: f64,
    inner_width: f64,
) -> String {
    let mut out = String::new();
    let left = padding;
    let right = padding + inner_width;

    for row in 0..=GRID_ROWS {
        let t = row as f64 / GRID_ROWS as f64;
        let y = bottom - (bottom - top) * t;
        out.push_str(&format!(
            r#"<line x1="{left:.1}" y1="{y:.1}" x2="{right:.1}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
        ));
        out.push_str(&text(
            left - 8.0,
            y + 4.0,
            "end",
            &format!("{:.0}", hr_scale.domain_at(t)),
        ));
    }

    out.push_str(&axis_title(left - 48.0, (top + bottom) / 2.0, -90.0, "BPM"));
    out.push_str(&step_path(
        x_values,
        heart_rate,
        x_scale,
        hr_scale,
        HEART_RATE_COLOR,
    ));
    out
}

fn legend(right: f64, top: f64, with_heart_rate: bool) -> String {
    let mut entries = vec![
        (RAW_COLOR, "Raw elevation"),
        (FILTERED_COLOR, "Filtered elevation"),
        (GRADE_COLOR, "Stepped grade"),
    ];
    if with_heart_rate {
        entries.push((HEART_RATE_COLOR, "Avg heart rate"));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, (color, label))| {
            let y = top + 16.0 + i as f64 * 18.0;
            format!(
                r#"<rect x="{:.1}" y="{:.1}" width="10" height="10" fill="{}"/>{}"#,
                right - 150.0,
                y - 9.0,
                color,
                text(right - 134.0, y, "start", label)
            )
        })
        .collect()
}

fn text(x: f64, y: f64, anchor: &str, content: &str) -> String {
    format!(
        r#"<text x="{x:.1}" y="{y:.1}" font-family="{FONT_FAMILY}" font-size="13" fill="{TEXT_COLOR}" text-anchor="{anchor}">{content}</text>"#,
    )
}

fn axis_title(x: f64, y: f64, rotation: f64, content: &str) -> String {
    format!(
        r#"<text x="{x:.1}" y="{y:.1}" font-family="{FONT_FAMILY}" font-size="14" fill="{TEXT_COLOR}" text-anchor="middle" transform="rotate({rotation:.0} {x:.1} {y:.1})">{content}</text>"#,
    )
}
