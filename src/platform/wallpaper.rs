//! Wallpaper dispatch via per-monitor slicing and xwallpaper
//!
//! Turns one committed crop request into a wallpaper on every monitor:
//! the source image is scaled to cover the virtual canvas at the committed
//! zoom, cropped to the committed origin, cut into one slice per monitor
//! frame, compensated for per-monitor pixel density, and handed to
//! `xwallpaper --output <name>` one monitor at a time. Slices live in a
//! temp directory that is cleaned up once every setter call has returned.

use std::path::PathBuf;
use std::process::Command;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tempfile::tempdir;
use thiserror::Error;

use crate::domain::canvas::{CanvasError, VirtualCanvas};
use crate::domain::monitor::MonitorDescriptor;
use crate::domain::placement::CropRequest;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("failed to open image {path}: {source}")]
    ImageOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to create slice staging directory: {0}")]
    Staging(std::io::Error),

    #[error("failed to write slice {path}: {source}")]
    SliceWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to invoke xwallpaper: {0}")]
    SetterSpawn(std::io::Error),

    #[error("xwallpaper failed for output {output} with {status}")]
    SetterFailed {
        output: String,
        status: std::process::ExitStatus,
    },
}

/// Applies a committed crop request to every monitor.
pub fn set_wallpaper(
    request: &CropRequest,
    monitors: &[MonitorDescriptor],
) -> Result<(), DispatchError> {
    let canvas = VirtualCanvas::normalize(monitors)?;

    let image = image::ImageReader::open(&request.path)
        .map_err(|source| DispatchError::ImageOpen {
            path: request.path.clone(),
            source,
        })?
        .decode()
        .map_err(|source| DispatchError::ImageDecode {
            path: request.path.clone(),
            source,
        })?;

    let spanned = span_canvas(&image, &canvas, request);
    let slices = slice_for_monitors(&spanned, &canvas, monitors);

    let staging = tempdir().map_err(DispatchError::Staging)?;
    for (name, slice) in slices {
        let file = staging.path().join(format!("{name}.png"));
        slice.save(&file).map_err(|source| DispatchError::SliceWrite {
            path: file.clone(),
            source,
        })?;

        tracing::info!(output = name, slice = %file.display(), "setting wallpaper");
        let status = Command::new("xwallpaper")
            .arg("--output")
            .arg(&name)
            .arg("--maximize")
            .arg(&file)
            .status()
            .map_err(DispatchError::SetterSpawn)?;
        if !status.success() {
            return Err(DispatchError::SetterFailed {
                output: name,
                status,
            });
        }
    }

    Ok(())
}

/// Scales the image to cover the whole canvas at the committed zoom, then
/// crops to the committed origin. The result is exactly canvas-sized.
fn span_canvas(image: &DynamicImage, canvas: &VirtualCanvas, request: &CropRequest) -> DynamicImage {
    let (width, height) = cover_size(
        canvas.total_width(),
        canvas.max_height(),
        image_aspect(image),
        request.scale,
    );
    image
        .resize_to_fill(width, height, FilterType::Lanczos3)
        .crop_imm(
            request.left,
            request.top,
            canvas.total_width(),
            canvas.max_height(),
        )
}

/// Target size covering a canvas of `total_width` x `max_height` at the
/// given scale, preserving the image aspect ratio. The dominant canvas axis
/// drives the fit so that scale 1 covers the canvas exactly.
pub fn cover_size(total_width: u32, max_height: u32, image_aspect: f64, scale: f64) -> (u32, u32) {
    if max_height > total_width {
        let height = (max_height as f64 * scale).round().max(1.0);
        (((height * image_aspect).round().max(1.0)) as u32, height as u32)
    } else {
        let width = (total_width as f64 * scale).round().max(1.0);
        (width as u32, ((width / image_aspect).round().max(1.0)) as u32)
    }
}

/// Cuts one slice per monitor out of the spanned canvas image.
///
/// Denser monitors are magnified relative to the coarsest one so content
/// keeps the same physical size across panels; the slice handed to the
/// setter is always the monitor's native pixel size.
pub fn slice_for_monitors(
    spanned: &DynamicImage,
    canvas: &VirtualCanvas,
    monitors: &[MonitorDescriptor],
) -> Vec<(String, DynamicImage)> {
    let min_dpi = canvas.min_dpi();
    let mut slices = Vec::with_capacity(monitors.len());

    for (monitor, frame) in monitors.iter().zip(canvas.monitor_frames()) {
        let width = monitor.pixel_width;
        let height = monitor.pixel_height;
        let slice = spanned.crop_imm(frame.x as u32, frame.y as u32, width, height);

        let factor = if min_dpi > 0.0 { monitor.dpi() / min_dpi } else { 1.0 };
        let slice = if (factor - 1.0).abs() < 1e-9 {
            slice
        } else {
            // Magnify by the density factor, then take a native-size window
            // anchored past the bezel, clamped inside the magnified slice.
            let scaled_w = ((width as f64 * factor).round() as u32).max(width);
            let scaled_h = ((height as f64 * factor).round() as u32).max(height);
            let window_x = monitor.bezel_x.min(scaled_w - width);
            let window_y = ((monitor.y.max(0) as f64 * (factor - 1.0)).round() as u32
                + monitor.bezel_y)
                .min(scaled_h - height);
            slice
                .resize_to_fill(scaled_w, scaled_h, FilterType::Lanczos3)
                .crop_imm(window_x, window_y, width, height)
        };

        slices.push((monitor.name.clone(), slice));
    }

    slices
}

fn image_aspect(image: &DynamicImage) -> f64 {
    let (width, height) = image.dimensions();
    width.max(1) as f64 / height.max(1) as f64
}
