//! Monitor descriptors as reported by the enumerator
//!
//! A descriptor is immutable once read. The enumerator's ordering is
//! authoritative: it determines each monitor's horizontal position along the
//! virtual canvas and is never re-sorted.

use serde::{Deserialize, Serialize};

/// A physical monitor with its pixel geometry, virtual-desktop position and
/// physical dimensions.
///
/// `bezel_x`/`bezel_y` are the left/top bezel widths in pixels. They default
/// to zero and only matter for seamless multi-monitor spans, where the image
/// content "hidden" behind the bezels keeps straight lines straight across
/// the gap between panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    pub name: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub physical_width_mm: f64,
    pub physical_height_mm: f64,
    /// Top-left position in the OS virtual desktop; may be negative.
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub bezel_x: u32,
    #[serde(default)]
    pub bezel_y: u32,
}

impl MonitorDescriptor {
    /// Pixel density in pixels per millimetre.
    ///
    /// The enumerator guarantees `physical_height_mm > 0`; descriptors with
    /// an unusable physical size are dropped before they get here.
    pub fn dpi(&self) -> f64 {
        self.pixel_height as f64 / self.physical_height_mm
    }

    /// Width this monitor occupies on the virtual canvas, bezels included.
    pub fn spanned_width(&self) -> u32 {
        self.pixel_width + 2 * self.bezel_x
    }

    /// Height this monitor occupies on the virtual canvas, bezel included.
    pub fn spanned_height(&self) -> u32 {
        self.pixel_height + self.bezel_y
    }
}
