//! Resolving viewport state into a concrete crop request
//!
//! The resolver is the bridge between the interactive preview and the
//! wallpaper setter: it converts the (fractional, container-space) viewport
//! offset back into integer virtual-canvas pixels. It is a pure derivation;
//! only handing the result to the dispatcher has an external effect.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::domain::canvas::VirtualCanvas;
use crate::domain::viewport::ViewportState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// Commit attempted before an image exists. Callers must keep the
    /// commit action disabled until a load succeeds.
    #[error("no image loaded; nothing to place")]
    NoImageLoaded,
}

/// Everything the wallpaper setter needs for one committed placement.
///
/// `top`/`left` are in virtual-canvas pixels. Sub-pixel offsets are
/// intentionally lost here: the setter works on integer pixel grids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRequest {
    pub path: PathBuf,
    pub scale: f64,
    pub top: u32,
    pub left: u32,
}

/// Resolves the current viewport against the canvas into a crop request.
///
/// Pure: repeated calls with the same inputs yield the same request and
/// nothing is mutated.
pub fn resolve(
    viewport: &ViewportState,
    canvas: &VirtualCanvas,
    container_width: f64,
) -> Result<CropRequest, PlacementError> {
    let image = viewport.image().ok_or(PlacementError::NoImageLoaded)?;

    let canvas_scale = canvas.canvas_scale(container_width);
    let offset = viewport.offset();
    // The bound invariant keeps offsets <= 0, so the crop origin is >= 0;
    // the max(0.0) only guards the cast.
    let top = (-offset.y / canvas_scale).round().max(0.0) as u32;
    let left = (-offset.x / canvas_scale).round().max(0.0) as u32;

    Ok(CropRequest {
        path: image.path().to_path_buf(),
        scale: viewport.zoom(),
        top,
        left,
    })
}
