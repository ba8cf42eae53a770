use std::cell::RefCell;

use crate::error::RasterError;
use crate::types::profile::RasterConfig;

thread_local! {
    static FONT_DB: RefCell<usvg::fontdb::Database> = RefCell::new(load_font_db());
}

pub fn rasterize(svg: &str, config: &RasterConfig) -> Result<Vec<u8>, RasterError> {
    FONT_DB.with(|fontdb| {
        let fontdb = fontdb.borrow();
        rasterize_with_fontdb(svg, config, &fontdb)
    })
}

fn load_font_db() -> usvg::fontdb::Database {
    let mut fontdb = usvg::fontdb::Database::new();
    // Prefer explicitly known font files so axis text renders reliably in containers.
    for path in [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ] {
        let _ = fontdb.load_font_file(path);
    }
    fontdb.load_system_fonts();
    fontdb
}

fn rasterize_with_fontdb(
    svg: &str,
    config: &RasterConfig,
    fontdb: &usvg::fontdb::Database,
) -> Result<Vec<u8>, RasterError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options, fontdb)
        .map_err(|e| RasterError::RenderFailed(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(config.width, config.height)
        .ok_or_else(|| RasterError::RenderFailed("Failed to create pixmap".to_string()))?;

    if let Some((r, g, b, a)) = config.background {
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    let transform = tiny_skia::Transform::from_scale(
        config.width as f32 / tree.size().width(),
        config.height as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RasterError::RenderFailed(format!("Failed to encode PNG: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    fn minimal_svg() -> &'static str {
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50" viewBox="0 0 100 50"><rect x="10" y="10" width="30" height="20" fill="#1C7ED6"/></svg>"##
    }

    #[test]
    fn produces_png_bytes() {
        let config = RasterConfig {
            width: 100,
            height: 50,
            background: None,
        };
        let bytes = rasterize(minimal_svg(), &config).expect("png");
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn background_fill_does_not_break_encoding() {
        let config = RasterConfig {
            width: 200,
            height: 100,
            background: Some((255, 255, 255, 255)),
        };
        let bytes = rasterize(minimal_svg(), &config).expect("png");
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn malformed_svg_is_rejected() {
        let config = RasterConfig {
            width: 100,
            height: 50,
            background: None,
        };
        assert!(rasterize("not an svg", &config).is_err());
    }
}
