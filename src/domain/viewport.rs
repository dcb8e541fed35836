//! Pan/zoom viewport state for the loaded image
//!
//! The viewport tracks where the image sits relative to the preview
//! container. Drag and wheel gestures mutate it through clamped
//! transitions, so that after every operation the monitors can only ever
//! see image, never empty canvas:
//!
//! * `zoom` never drops below 1 - at zoom 1 the image exactly covers the
//!   container width at its native placement.
//! * per axis, `bound <= offset <= 0`, where
//!   `bound = container_width * (aspect_ratio for y, 1 for x) - natural * zoom`.
//!
//! When an axis is underfilled (the image smaller than the canvas on that
//! axis, i.e. `bound > 0`) the clamp interval collapses and the offset pins
//! to 0, keeping the image top/left aligned instead of inverting the
//! interval.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

use crate::domain::canvas::VirtualCanvas;
use crate::domain::core::Vec2;

/// Wheel offsets are divided by this before feeding the zoom factor; a full
/// notch of a typical wheel (~120 units) moves the zoom by 0.16.
pub const WHEEL_ZOOM_DIVISOR: f64 = 750.0;

/// Decoded image installed in the viewport.
///
/// Cloning shares the decoded buffer; the buffer itself is freed when the
/// last handle drops. Replacing the viewport's handle is therefore the
/// single release point for an image that nobody else shares.
#[derive(Clone)]
pub struct ImageHandle {
    pixels: Arc<DynamicImage>,
    path: PathBuf,
}

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>, pixels: DynamicImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            path: path.into(),
        }
    }

    /// Filesystem path the image was decoded from; this is what gets handed
    /// to the wallpaper setter on commit.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    #[cfg(test)]
    fn buffer(&self) -> &Arc<DynamicImage> {
        &self.pixels
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.pixels.dimensions();
        f.debug_struct("ImageHandle")
            .field("path", &self.path)
            .field("dimensions", &format_args!("{w}x{h}"))
            .finish()
    }
}

/// How the image relates to the canvas on one axis at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFit {
    /// Image larger than the canvas: the offset may roam in `[bound, 0]`.
    Overflowing,
    /// Image smaller than the canvas even at this zoom: the offset is
    /// pinned to 0. A recognized edge case, not a failure.
    Underfilled,
}

/// Per-axis fit of the image against the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasFit {
    pub x: AxisFit,
    pub y: AxisFit,
}

/// Mutable pan/zoom state of the session's image.
#[derive(Debug)]
pub struct ViewportState {
    offset: Vec2,
    zoom: f64,
    image: Option<ImageHandle>,
    natural_size: Option<Vec2>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            image: None,
            natural_size: None,
        }
    }

    /// Installs a freshly decoded image and resets pan/zoom.
    ///
    /// `natural_size` is the image's display size in container pixels at
    /// zoom 1. The previous handle stays alive until the replacement is
    /// installed, then is released here exactly once; when loads race, the
    /// last one to land wins.
    pub fn load_image(&mut self, handle: ImageHandle, natural_size: Vec2) {
        tracing::debug!(path = %handle.path().display(), "installing image");
        let previous = self.image.replace(handle);
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
        self.natural_size = Some(natural_size);
        if let Some(previous) = previous {
            tracing::debug!(path = %previous.path().display(), "releasing replaced image");
            drop(previous);
        }
    }

    /// Pans the image by a gesture delta, clamped so no monitor can see
    /// past the image edges. A zero delta never changes the offset.
    pub fn apply_drag(&mut self, delta: Vec2, canvas: &VirtualCanvas, container_width: f64) {
        let Some(natural) = self.natural_size else {
            return;
        };
        let candidate = self.offset + delta;
        self.offset = Vec2::new(
            clamp_offset(candidate.x, bound_x(container_width, natural.x, self.zoom)),
            clamp_offset(
                candidate.y,
                bound_y(container_width, canvas.aspect_ratio(), natural.y, self.zoom),
            ),
        );
    }

    /// Applies a cumulative wheel offset: scrolling up (negative offsets)
    /// zooms in, scrolling down zooms back out toward the floor of 1.
    ///
    /// Offset and zoom change in one transition, with the offset re-clamped
    /// against the bounds of the NEW zoom - a zoom-out that would expose
    /// empty canvas pulls the offset back toward 0 in the same step.
    pub fn apply_zoom(&mut self, wheel_offset_y: f64, canvas: &VirtualCanvas, container_width: f64) {
        let Some(natural) = self.natural_size else {
            return;
        };
        let zoom = (1.0 - wheel_offset_y / WHEEL_ZOOM_DIVISOR).max(1.0);
        let offset = Vec2::new(
            clamp_offset(self.offset.x, bound_x(container_width, natural.x, zoom)),
            clamp_offset(
                self.offset.y,
                bound_y(container_width, canvas.aspect_ratio(), natural.y, zoom),
            ),
        );
        (self.offset, self.zoom) = (offset, zoom);
    }

    /// Reports how the image fits the canvas per axis at the current zoom,
    /// or `None` when no image is loaded.
    pub fn fit(&self, canvas: &VirtualCanvas, container_width: f64) -> Option<CanvasFit> {
        let natural = self.natural_size?;
        let classify = |bound: f64| {
            if bound > 0.0 {
                AxisFit::Underfilled
            } else {
                AxisFit::Overflowing
            }
        };
        Some(CanvasFit {
            x: classify(bound_x(container_width, natural.x, self.zoom)),
            y: classify(bound_y(
                container_width,
                canvas.aspect_ratio(),
                natural.y,
                self.zoom,
            )),
        })
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    /// Display size of the image in container pixels at zoom 1.
    pub fn natural_size(&self) -> Option<Vec2> {
        self.natural_size
    }
}

fn bound_x(container_width: f64, natural_width: f64, zoom: f64) -> f64 {
    container_width - natural_width * zoom
}

fn bound_y(container_width: f64, aspect_ratio: f64, natural_height: f64, zoom: f64) -> f64 {
    container_width * aspect_ratio - natural_height * zoom
}

/// Clamps an offset into `[bound, 0]`. An underfilled axis (`bound > 0`)
/// collapses the interval and pins the offset to 0 rather than inverting.
fn clamp_offset(value: f64, bound: f64) -> f64 {
    if bound >= 0.0 {
        0.0
    } else {
        value.clamp(bound, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::monitor::MonitorDescriptor;
    use std::sync::Arc;

    const CONTAINER: f64 = 1500.0;

    fn monitor(name: &str, w: u32, h: u32, x: i32) -> MonitorDescriptor {
        MonitorDescriptor {
            name: name.to_string(),
            pixel_width: w,
            pixel_height: h,
            physical_width_mm: w as f64 / 4.0,
            physical_height_mm: h as f64 / 4.0,
            x,
            y: 0,
            bezel_x: 0,
            bezel_y: 0,
        }
    }

    /// 3000x1920 canvas, aspect ratio 0.64.
    fn canvas() -> VirtualCanvas {
        VirtualCanvas::normalize(&[
            monitor("DP-1", 1920, 1080, 0),
            monitor("HDMI-1", 1080, 1920, 1920),
        ])
        .unwrap()
    }

    fn handle(name: &str) -> ImageHandle {
        ImageHandle::new(name, DynamicImage::new_rgba8(4, 4))
    }

    /// Tall image: overflows the canvas on both axes once zoomed.
    fn tall_viewport() -> ViewportState {
        let mut viewport = ViewportState::new();
        // Display size at zoom 1: container wide, taller than the canvas
        // (canvas height in container pixels is 1500 * 0.64 = 960).
        viewport.load_image(handle("tall.png"), Vec2::new(CONTAINER, 2250.0));
        viewport
    }

    /// Wide image: shorter than the canvas on the y axis at zoom 1.
    fn wide_viewport() -> ViewportState {
        let mut viewport = ViewportState::new();
        viewport.load_image(handle("wide.png"), Vec2::new(CONTAINER, 843.75));
        viewport
    }

    fn assert_within_bounds(viewport: &ViewportState, canvas: &VirtualCanvas) {
        let natural = viewport.natural_size().unwrap();
        let bx = bound_x(CONTAINER, natural.x, viewport.zoom());
        let by = bound_y(CONTAINER, canvas.aspect_ratio(), natural.y, viewport.zoom());
        let offset = viewport.offset();
        assert!(offset.x <= 0.0 && offset.x >= bx.min(0.0), "x offset {} out of [{}, 0]", offset.x, bx);
        assert!(offset.y <= 0.0 && offset.y >= by.min(0.0), "y offset {} out of [{}, 0]", offset.y, by);
    }

    #[test]
    fn load_resets_pan_and_zoom() {
        let canvas = canvas();
        let mut viewport = tall_viewport();
        viewport.apply_zoom(-750.0, &canvas, CONTAINER);
        viewport.apply_drag(Vec2::new(-200.0, -300.0), &canvas, CONTAINER);

        viewport.load_image(handle("next.png"), Vec2::new(CONTAINER, 1000.0));
        assert_eq!(viewport.offset(), Vec2::ZERO);
        assert_eq!(viewport.zoom(), 1.0);
        assert_eq!(
            viewport.image().unwrap().path(),
            Path::new("next.png")
        );
    }

    #[test]
    fn replaced_image_is_released() {
        let mut viewport = ViewportState::new();
        let first = handle("first.png");
        let weak = Arc::downgrade(first.buffer());
        viewport.load_image(first, Vec2::new(CONTAINER, 1000.0));
        assert!(weak.upgrade().is_some());

        viewport.load_image(handle("second.png"), Vec2::new(CONTAINER, 900.0));
        assert!(weak.upgrade().is_none(), "first image buffer must be freed");
        assert_eq!(
            viewport.image().unwrap().path(),
            Path::new("second.png")
        );
    }

    #[test]
    fn zero_drag_is_idempotent() {
        let canvas = canvas();
        let mut viewport = tall_viewport();
        viewport.apply_drag(Vec2::new(-120.0, -80.0), &canvas, CONTAINER);
        let before = viewport.offset();
        viewport.apply_drag(Vec2::ZERO, &canvas, CONTAINER);
        assert_eq!(viewport.offset(), before);
    }

    #[test]
    fn drag_clamps_to_image_edges() {
        let canvas = canvas();
        let mut viewport = tall_viewport();

        // Way past the bottom-right: pinned to the bound.
        viewport.apply_drag(Vec2::new(-1e6, -1e6), &canvas, CONTAINER);
        let by = bound_y(CONTAINER, canvas.aspect_ratio(), 2250.0, 1.0);
        assert_eq!(viewport.offset().x, 0.0); // natural width == container
        assert_eq!(viewport.offset().y, by);

        // Way past the top-left: pinned to 0.
        viewport.apply_drag(Vec2::new(1e6, 1e6), &canvas, CONTAINER);
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn zoom_never_drops_below_one() {
        let canvas = canvas();
        let mut viewport = tall_viewport();
        viewport.apply_zoom(10_000.0, &canvas, CONTAINER);
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn wheel_mapping_is_monotonic() {
        let canvas = canvas();
        let offsets = [-3000.0, -1500.0, -750.0, -100.0, 0.0];
        let mut last = f64::INFINITY;
        for wheel in offsets {
            let mut viewport = tall_viewport();
            viewport.apply_zoom(wheel, &canvas, CONTAINER);
            assert!(
                viewport.zoom() <= last,
                "zoom must not increase as wheel offset grows"
            );
            assert!(viewport.zoom() >= 1.0);
            last = viewport.zoom();
        }
    }

    #[test]
    fn zoom_out_reclaims_exposed_canvas() {
        let canvas = canvas();
        let mut viewport = tall_viewport();

        // Zoom to 2x, drag to the far corner.
        viewport.apply_zoom(-750.0, &canvas, CONTAINER);
        assert_eq!(viewport.zoom(), 2.0);
        viewport.apply_drag(Vec2::new(-1e6, -1e6), &canvas, CONTAINER);
        let far = viewport.offset();
        assert!(far.x < 0.0 && far.y < 0.0);

        // Zooming back out shrinks the roaming room; the offset must be
        // re-clamped against the new zoom in the same transition.
        viewport.apply_zoom(0.0, &canvas, CONTAINER);
        assert_eq!(viewport.zoom(), 1.0);
        assert_within_bounds(&viewport, &canvas);
        assert!(viewport.offset().x > far.x || viewport.offset().x == 0.0);
    }

    #[test]
    fn underfilled_axis_pins_to_zero() {
        let canvas = canvas();
        let mut viewport = wide_viewport();

        // bound_y = 960 - 843.75 > 0: dragging down or up must leave the
        // image top-aligned, and must not panic on the inverted interval.
        viewport.apply_drag(Vec2::new(-100.0, -500.0), &canvas, CONTAINER);
        assert_eq!(viewport.offset().y, 0.0);
        viewport.apply_drag(Vec2::new(0.0, 500.0), &canvas, CONTAINER);
        assert_eq!(viewport.offset().y, 0.0);

        let fit = viewport.fit(&canvas, CONTAINER).unwrap();
        assert_eq!(fit.x, AxisFit::Overflowing);
        assert_eq!(fit.y, AxisFit::Underfilled);
    }

    #[test]
    fn underfilled_axis_recovers_when_zoomed() {
        let canvas = canvas();
        let mut viewport = wide_viewport();
        // At 2x the display height (1687.5) exceeds the canvas height (960).
        viewport.apply_zoom(-750.0, &canvas, CONTAINER);
        let fit = viewport.fit(&canvas, CONTAINER).unwrap();
        assert_eq!(fit.y, AxisFit::Overflowing);
        viewport.apply_drag(Vec2::new(0.0, -200.0), &canvas, CONTAINER);
        assert_eq!(viewport.offset().y, -200.0);
    }

    #[test]
    fn bounds_hold_across_gesture_sequences() {
        let canvas = canvas();
        let mut viewport = tall_viewport();
        let gestures: &[(f64, f64, f64)] = &[
            // (drag dx, drag dy, wheel offset)
            (-300.0, -150.0, -750.0),
            (500.0, -900.0, -1500.0),
            (-50.0, 2000.0, 0.0),
            (-1e4, -1e4, -200.0),
            (120.0, 40.0, 600.0),
        ];
        for &(dx, dy, wheel) in gestures {
            viewport.apply_drag(Vec2::new(dx, dy), &canvas, CONTAINER);
            assert_within_bounds(&viewport, &canvas);
            viewport.apply_zoom(wheel, &canvas, CONTAINER);
            assert!(viewport.zoom() >= 1.0);
            assert_within_bounds(&viewport, &canvas);
        }
    }

    #[test]
    fn gestures_without_an_image_are_ignored() {
        let canvas = canvas();
        let mut viewport = ViewportState::new();
        viewport.apply_drag(Vec2::new(-100.0, -100.0), &canvas, CONTAINER);
        viewport.apply_zoom(-750.0, &canvas, CONTAINER);
        assert_eq!(viewport.offset(), Vec2::ZERO);
        assert_eq!(viewport.zoom(), 1.0);
        assert!(viewport.fit(&canvas, CONTAINER).is_none());
    }
}
