//! Virtual canvas normalization
//!
//! Folds the ordered monitor list into a single virtual coordinate space:
//! monitors sit side by side left-to-right in enumeration order, the canvas
//! is as wide as all of them together (bezels included) and as tall as the
//! tallest one. All viewport clamping and placement math runs against this
//! canvas, never against raw OS coordinates.
//!
//! The canvas is derived state. It is recomputed whole whenever the monitor
//! list changes; adding or removing a monitor shifts every later monitor's
//! horizontal position, so incremental patching is never correct.

use crate::domain::core::Rect;
use crate::domain::monitor::MonitorDescriptor;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    /// The enumerator reported zero monitors. Callers must treat this as
    /// "no display target" and suppress the rest of the pipeline.
    #[error("no monitors to span; nothing to lay out")]
    EmptyMonitorSet,
}

/// Normalized virtual coordinate space for a set of monitors.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCanvas {
    total_width: u32,
    max_height: u32,
    min_dpi: f64,
    frames: Vec<Rect>,
}

impl VirtualCanvas {
    /// Normalizes an ordered monitor list into a virtual canvas.
    ///
    /// Pure function of its input: call it again whenever the monitor list
    /// changes instead of mutating an existing canvas.
    pub fn normalize(monitors: &[MonitorDescriptor]) -> Result<Self, CanvasError> {
        if monitors.is_empty() {
            return Err(CanvasError::EmptyMonitorSet);
        }

        let total_width = monitors.iter().map(MonitorDescriptor::spanned_width).sum();
        let max_height = monitors
            .iter()
            .map(MonitorDescriptor::spanned_height)
            .max()
            .unwrap_or(0);
        let min_dpi = monitors
            .iter()
            .map(MonitorDescriptor::dpi)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0);

        let mut frames = Vec::with_capacity(monitors.len());
        let mut cursor: u32 = 0;
        for monitor in monitors {
            // Horizontal: left bezel, then the visible panel. Vertical: the
            // monitor's own desktop y anchors it, clamped so the frame never
            // leaves the canvas.
            let x = cursor + monitor.bezel_x;
            let y = (monitor.y.max(0) as u32 + monitor.bezel_y)
                .min(max_height - monitor.pixel_height);
            frames.push(Rect::new(
                x as i32,
                y as i32,
                monitor.pixel_width as i32,
                monitor.pixel_height as i32,
            ));
            cursor += monitor.spanned_width();
        }

        Ok(Self {
            total_width,
            max_height,
            min_dpi,
            frames,
        })
    }

    /// Canvas width in virtual pixels: the sum of every monitor's spanned
    /// width, in enumeration order.
    pub fn total_width(&self) -> u32 {
        self.total_width
    }

    /// Canvas height in virtual pixels: the tallest spanned monitor.
    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Height-over-width ratio of the canvas.
    pub fn aspect_ratio(&self) -> f64 {
        self.max_height as f64 / self.total_width as f64
    }

    /// Lowest pixel density across the set, in pixels per millimetre.
    ///
    /// Informational: downstream slicing magnifies denser monitors relative
    /// to this baseline. Images are never rejected for being too small.
    pub fn min_dpi(&self) -> f64 {
        self.min_dpi
    }

    /// Factor that maps virtual-canvas pixels to container pixels when the
    /// canvas is squeezed into a preview container of the given width.
    pub fn canvas_scale(&self, container_width: f64) -> f64 {
        container_width / self.total_width as f64
    }

    /// Per-monitor frames on the virtual canvas, in enumeration order.
    pub fn monitor_frames(&self) -> &[Rect] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, w: u32, h: u32, x: i32, y: i32) -> MonitorDescriptor {
        MonitorDescriptor {
            name: name.to_string(),
            pixel_width: w,
            pixel_height: h,
            physical_width_mm: w as f64 / 4.0,
            physical_height_mm: h as f64 / 4.0,
            x,
            y,
            bezel_x: 0,
            bezel_y: 0,
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        let result = VirtualCanvas::normalize(&[]);
        assert_eq!(result, Err(CanvasError::EmptyMonitorSet));
    }

    #[test]
    fn landscape_plus_portrait_pair() {
        let monitors = vec![
            monitor("DP-1", 1920, 1080, 0, 0),
            monitor("HDMI-1", 1080, 1920, 1920, 0),
        ];
        let canvas = VirtualCanvas::normalize(&monitors).unwrap();
        assert_eq!(canvas.total_width(), 3000);
        assert_eq!(canvas.max_height(), 1920);
        assert!((canvas.aspect_ratio() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn min_dpi_picks_the_coarsest_panel() {
        let mut dense = monitor("eDP-1", 2880, 1800, 0, 0);
        dense.physical_height_mm = 180.0; // 10 px/mm
        let mut coarse = monitor("DP-2", 1920, 1080, 2880, 0);
        coarse.physical_height_mm = 360.0; // 3 px/mm
        let canvas = VirtualCanvas::normalize(&[dense, coarse]).unwrap();
        assert!((canvas.min_dpi() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn enumeration_order_is_authoritative() {
        // The second monitor sits left of the first in OS coordinates, but
        // the canvas still lays them out in the order given.
        let monitors = vec![
            monitor("DP-1", 1000, 500, 1000, 0),
            monitor("DP-2", 800, 600, -800, 0),
        ];
        let canvas = VirtualCanvas::normalize(&monitors).unwrap();
        let frames = canvas.monitor_frames();
        assert_eq!(frames[0].x, 0);
        assert_eq!(frames[1].x, 1000);
    }

    #[test]
    fn bezels_widen_the_canvas() {
        let mut left = monitor("DP-1", 1920, 1080, 0, 0);
        left.bezel_x = 20;
        let mut right = monitor("DP-2", 1920, 1080, 1920, 0);
        right.bezel_x = 20;
        right.bezel_y = 10;
        let canvas = VirtualCanvas::normalize(&[left, right]).unwrap();
        assert_eq!(canvas.total_width(), 2 * 1960);
        assert_eq!(canvas.max_height(), 1090);

        let frames = canvas.monitor_frames();
        assert_eq!(frames[0], Rect::new(20, 0, 1920, 1080));
        // Second frame starts after the first spanned width plus its own
        // left bezel; its y is pushed down by the top bezel.
        assert_eq!(frames[1], Rect::new(1960 + 20, 10, 1920, 1080));
    }

    #[test]
    fn frames_stay_inside_the_canvas() {
        let monitors = vec![
            monitor("DP-1", 1920, 1080, 0, 600),
            monitor("HDMI-1", 1080, 1920, 1920, 0),
        ];
        let canvas = VirtualCanvas::normalize(&monitors).unwrap();
        for frame in canvas.monitor_frames() {
            assert!(frame.x >= 0);
            assert!(frame.y >= 0);
            assert!(frame.right() <= canvas.total_width() as i32);
            assert!(frame.bottom() <= canvas.max_height() as i32);
        }
    }

    #[test]
    fn canvas_scale_maps_to_container() {
        let monitors = vec![
            monitor("DP-1", 1920, 1080, 0, 0),
            monitor("HDMI-1", 1080, 1920, 1920, 0),
        ];
        let canvas = VirtualCanvas::normalize(&monitors).unwrap();
        assert!((canvas.canvas_scale(1500.0) - 0.5).abs() < 1e-12);
    }
}
