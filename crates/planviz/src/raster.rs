#![forbid(unsafe_code)]

use crate::fallback::foreign_object_text_fallback;
use crate::{PlanViz, export_file_name};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Render(#[from] planviz_render::Error),
    #[error("nothing has been rendered yet")]
    NothingRendered,
    #[error("the drawing is empty")]
    EmptyDrawing,
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color for JPG rendering")]
    JpegBackground,
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

/// An encoded image plus the file name the page would offer for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Rasterizes the current drawing of `viz` to PNG, named after the page title.
pub fn export_png(viz: &PlanViz, options: &RasterOptions) -> Result<Export> {
    let svg = raster_svg(viz)?;
    let bytes = svg_to_png(&svg, options)?;
    let file_name = export_file_name(viz.metadata().title.as_deref(), "png");
    tracing::info!(file = %file_name, bytes = bytes.len(), "exported PNG");
    Ok(Export { file_name, bytes })
}

pub fn export_jpeg(viz: &PlanViz, options: &RasterOptions) -> Result<Export> {
    let svg = raster_svg(viz)?;
    let bytes = svg_to_jpeg(&svg, options)?;
    let file_name = export_file_name(viz.metadata().title.as_deref(), "jpg");
    tracing::info!(file = %file_name, bytes = bytes.len(), "exported JPG");
    Ok(Export { file_name, bytes })
}

/// The current drawing with HTML labels flattened to `<text>`.
fn raster_svg(viz: &PlanViz) -> Result<String> {
    let rendered = viz.rendered().ok_or(RasterError::NothingRendered)?;
    if rendered.viewport.is_empty() {
        return Err(RasterError::EmptyDrawing);
    }
    let drawing = foreign_object_text_fallback(&rendered.drawing, viz.config().font_size)?;
    Ok(drawing.to_svg())
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let Some(color) = parse_tiny_skia_color(bg) else {
        return Err(RasterError::JpegBackground);
    };
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // Opaque background, so alpha is always 255.
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst.copy_from_slice(&src[..3]);
    }

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "sans-serif".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    // usvg maps the root viewBox onto (0,0)..size already.
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    let (r, g, b, a) = match bytes.len() {
        3 | 4 => (
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            bytes.get(3).map_or(Some(255), |&c| hex1(c))?,
        ),
        6 | 8 => (
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            bytes.get(6..8).map_or(Some(255), hex2)?,
        ),
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}
