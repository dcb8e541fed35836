//! Placement preview rendering
//!
//! Draws the current session state the way the interactive surface shows
//! it: the image panned/zoomed under a container-scaled copy of the virtual
//! canvas, with each monitor outlined and labelled on top. Layout
//! calculation is separated from rendering so the geometry is testable
//! without rasterizing anything.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::DynamicImage;
use image::imageops::FilterType;
use tiny_skia::{
    Color, FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Rect as SkiaRect, Stroke, Transform,
};
use thiserror::Error;

use crate::app::session::Session;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("nothing to preview: no monitors normalized")]
    NoCanvas,

    #[error("nothing to preview: no image loaded")]
    NoImage,

    #[error("failed to create {width}x{height} preview pixmap")]
    PixmapCreationFailed { width: u32, height: u32 },

    #[error("failed to write preview PNG: {0}")]
    PngWrite(String),
}

/// Label font size in pixels.
const LABEL_PX: f32 = 16.0;
/// Padding between a monitor outline and its label.
const LABEL_PAD: f32 = 6.0;

/// Fonts probed for monitor labels, in order.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
];

/// One monitor's outline on the preview, in container pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOutline {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub label: String,
}

/// Pre-calculated preview geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayout {
    /// Preview surface dimensions (the container-scaled canvas).
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Image top-left in container pixels; <= 0 on overflowing axes.
    pub image_origin: (f32, f32),
    /// Image display size under the current zoom.
    pub image_size: (f32, f32),
    pub outlines: Vec<MonitorOutline>,
}

impl PreviewLayout {
    /// Computes the preview geometry for the session's current state.
    pub fn from_session(session: &Session) -> Result<Self, RendererError> {
        let canvas = session.canvas().ok_or(RendererError::NoCanvas)?;
        let natural = session
            .viewport()
            .natural_size()
            .ok_or(RendererError::NoImage)?;

        let container = session.settings().container_width();
        let scale = canvas.canvas_scale(container);
        let offset = session.viewport().offset();
        let zoom = session.viewport().zoom();

        let outlines = session
            .monitors()
            .iter()
            .zip(canvas.monitor_frames())
            .map(|(monitor, frame)| MonitorOutline {
                x: (frame.x as f64 * scale) as f32,
                y: (frame.y as f64 * scale) as f32,
                w: (frame.w as f64 * scale) as f32,
                h: (frame.h as f64 * scale) as f32,
                label: monitor.name.clone(),
            })
            .collect();

        Ok(Self {
            canvas_width: container as f32,
            canvas_height: (container * canvas.aspect_ratio()) as f32,
            image_origin: (offset.x as f32, offset.y as f32),
            image_size: ((natural.x * zoom) as f32, (natural.y * zoom) as f32),
            outlines,
        })
    }
}

/// Rasterizes preview layouts with tiny-skia.
pub struct PreviewRenderer {
    font: Option<FontVec>,
}

impl PreviewRenderer {
    /// Creates a renderer, probing the usual system font locations for the
    /// label face.
    pub fn new() -> Self {
        Self {
            font: discover_system_font(),
        }
    }

    /// Creates a renderer with a specific (or no) label font.
    pub fn with_font(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Renders the session's current placement.
    pub fn render(&self, session: &Session) -> Result<Pixmap, RendererError> {
        let layout = PreviewLayout::from_session(session)?;
        let photo = session.viewport().image().map(|handle| handle.pixels());
        self.render_layout(&layout, photo)
    }

    /// Renders a pre-computed layout; the photo is optional so geometry can
    /// be rendered on its own.
    pub fn render_layout(
        &self,
        layout: &PreviewLayout,
        photo: Option<&DynamicImage>,
    ) -> Result<Pixmap, RendererError> {
        let width = layout.canvas_width.round().max(1.0) as u32;
        let height = layout.canvas_height.round().max(1.0) as u32;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RendererError::PixmapCreationFailed { width, height })?;
        pixmap.fill(Color::from_rgba8(24, 24, 24, 255));

        if let Some(photo) = photo {
            self.draw_photo(&mut pixmap, layout, photo);
        }
        for outline in &layout.outlines {
            self.draw_outline(&mut pixmap, outline);
            match &self.font {
                Some(font) => self.draw_label(&mut pixmap, font, outline),
                None => self.draw_marker(&mut pixmap, outline),
            }
        }

        Ok(pixmap)
    }

    /// Writes the pixmap as a PNG file.
    pub fn save_png(&self, pixmap: &Pixmap, path: &Path) -> Result<(), RendererError> {
        pixmap
            .save_png(path)
            .map_err(|err| RendererError::PngWrite(err.to_string()))
    }

    fn draw_photo(&self, pixmap: &mut Pixmap, layout: &PreviewLayout, photo: &DynamicImage) {
        let width = layout.image_size.0.round().max(1.0) as u32;
        let height = layout.image_size.1.round().max(1.0) as u32;
        let resized = photo.resize_exact(width, height, FilterType::Triangle);
        let data = premultiply_rgba(resized.to_rgba8().into_raw());

        let Some(size) = IntSize::from_wh(width, height) else {
            return;
        };
        let Some(photo_pixmap) = Pixmap::from_vec(data, size) else {
            return;
        };
        pixmap.draw_pixmap(
            layout.image_origin.0.round() as i32,
            layout.image_origin.1.round() as i32,
            photo_pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_outline(&self, pixmap: &mut Pixmap, outline: &MonitorOutline) {
        let Some(rect) = SkiaRect::from_xywh(outline.x, outline.y, outline.w, outline.h) else {
            return;
        };

        let mut fill = Paint::default();
        fill.set_color(Color::from_rgba8(0, 0, 0, 96));
        pixmap.fill_rect(rect, &fill, Transform::identity(), None);

        let mut path_builder = PathBuilder::new();
        path_builder.push_rect(rect);
        if let Some(path) = path_builder.finish() {
            let mut stroke_paint = Paint::default();
            stroke_paint.set_color(Color::from_rgba8(255, 255, 255, 200));
            stroke_paint.anti_alias = true;
            let stroke = Stroke {
                width: 2.0,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), None);
        }
    }

    /// Rasterizes the monitor's name just inside its top-left corner.
    fn draw_label(&self, pixmap: &mut Pixmap, font: &FontVec, outline: &MonitorOutline) {
        let scale = PxScale::from(LABEL_PX);
        let scaled = font.as_scaled(scale);
        let max_x = outline.x + outline.w - LABEL_PAD;
        let baseline = outline.y + LABEL_PAD + scaled.ascent();

        let pixmap_width = pixmap.width() as i32;
        let pixmap_height = pixmap.height() as i32;
        let pixels = pixmap.pixels_mut();

        let mut pen_x = outline.x + LABEL_PAD;
        for ch in outline.label.chars() {
            let glyph_id = scaled.glyph_id(ch);
            let advance = scaled.h_advance(glyph_id);
            if pen_x + advance > max_x {
                break;
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(pen_x, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px >= 0 && px < pixmap_width && py >= 0 && py < pixmap_height {
                        let idx = (py * pixmap_width + px) as usize;
                        pixels[idx] = blend_white(pixels[idx], coverage);
                    }
                });
            }
            pen_x += advance;
        }
    }

    /// Fallback when no label font is available: a small corner marker, so
    /// monitors stay tell-apart-able even without text.
    fn draw_marker(&self, pixmap: &mut Pixmap, outline: &MonitorOutline) {
        let mut path_builder = PathBuilder::new();
        path_builder.push_circle(outline.x + 12.0, outline.y + 12.0, 4.0);
        if let Some(path) = path_builder.finish() {
            let mut paint = Paint::default();
            paint.set_color(Color::from_rgba8(255, 255, 255, 255));
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_system_font() -> Option<FontVec> {
    for path in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(bytes) {
                tracing::debug!(path = %path, "using label font");
                return Some(font);
            }
        }
    }
    tracing::debug!("no system font found; preview labels fall back to markers");
    None
}

/// Straight-alpha RGBA to the premultiplied form tiny-skia stores.
fn premultiply_rgba(mut data: Vec<u8>) -> Vec<u8> {
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3] as u16;
        if alpha < 255 {
            px[0] = (px[0] as u16 * alpha / 255) as u8;
            px[1] = (px[1] as u16 * alpha / 255) as u8;
            px[2] = (px[2] as u16 * alpha / 255) as u8;
        }
    }
    data
}

/// Composites white at the given coverage over a premultiplied pixel.
fn blend_white(pixel: PremultipliedColorU8, coverage: f32) -> PremultipliedColorU8 {
    let alpha = (coverage.clamp(0.0, 1.0) * 255.0 + 0.5) as u16;
    if alpha == 0 {
        return pixel;
    }
    let inverse = 255 - alpha;
    let blend = |dst: u8| (alpha + dst as u16 * inverse / 255).min(255) as u8;
    PremultipliedColorU8::from_rgba(
        blend(pixel.red()),
        blend(pixel.green()),
        blend(pixel.blue()),
        blend(pixel.alpha()),
    )
    .unwrap_or(pixel)
}
