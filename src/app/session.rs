//! Interactive session state
//!
//! The session owns everything a single run of the tool works with: the
//! monitor list, the virtual canvas derived from it, the pan/zoom viewport
//! and the preview settings. All mutation happens synchronously inside
//! gesture handlers; each handler runs to completion before the next event
//! is looked at, so no intermediate state is ever observable.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use thiserror::Error;

use crate::config::PreviewSettings;
use crate::domain::canvas::{CanvasError, VirtualCanvas};
use crate::domain::core::Vec2;
use crate::domain::monitor::MonitorDescriptor;
use crate::domain::placement::{self, CropRequest, PlacementError};
use crate::domain::viewport::{ImageHandle, ViewportState};

/// Errors raised while driving a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// A pan or zoom gesture forwarded from the preview surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer drag by a delta in container pixels.
    Drag { dx: f64, dy: f64 },
    /// Cumulative wheel offset; negative offsets zoom in.
    Wheel { offset_y: f64 },
}

/// One user's interactive wallpaper-placement session.
#[derive(Debug)]
pub struct Session {
    monitors: Vec<MonitorDescriptor>,
    canvas: Option<VirtualCanvas>,
    viewport: ViewportState,
    settings: PreviewSettings,
}

impl Session {
    pub fn new(settings: PreviewSettings) -> Self {
        Self {
            monitors: Vec::new(),
            canvas: None,
            viewport: ViewportState::new(),
            settings,
        }
    }

    /// Installs a new monitor list and recomputes the virtual canvas whole.
    ///
    /// An empty list leaves the session without a display target; gestures
    /// and commits are suppressed until monitors show up.
    pub fn set_monitors(&mut self, monitors: Vec<MonitorDescriptor>) {
        self.canvas = match VirtualCanvas::normalize(&monitors) {
            Ok(canvas) => Some(canvas),
            Err(CanvasError::EmptyMonitorSet) => {
                tracing::warn!("monitor set is empty; suppressing layout");
                None
            }
        };
        self.monitors = monitors;
    }

    pub fn monitors(&self) -> &[MonitorDescriptor] {
        &self.monitors
    }

    pub fn canvas(&self) -> Option<&VirtualCanvas> {
        self.canvas.as_ref()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn settings(&self) -> PreviewSettings {
        self.settings
    }

    /// Reads and decodes an image from disk, then installs it.
    ///
    /// This is the session's one blocking external read; until it returns
    /// the viewport keeps showing the previous image.
    pub fn load_image(&mut self, path: &Path) -> Result<(), SessionError> {
        let image = image::ImageReader::open(path)
            .map_err(|source| SessionError::ImageRead {
                path: path.to_path_buf(),
                source,
            })?
            .decode()
            .map_err(|source| SessionError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?;
        self.install_image(path, image);
        Ok(())
    }

    /// Installs an already-decoded image.
    ///
    /// The image is displayed container-wide at zoom 1, so its natural
    /// display size derives from the container width and the image's own
    /// aspect ratio.
    pub fn install_image(&mut self, path: &Path, image: DynamicImage) {
        let (width, height) = image.dimensions();
        let container = self.settings.container_width();
        let natural = Vec2::new(
            container,
            container * height.max(1) as f64 / width.max(1) as f64,
        );
        tracing::info!(
            path = %path.display(),
            width,
            height,
            "loaded image"
        );
        self.viewport
            .load_image(ImageHandle::new(path, image), natural);
    }

    /// Applies one gesture event to the viewport.
    ///
    /// Without monitors there is no canvas to clamp against and the event
    /// is dropped.
    pub fn apply_gesture(&mut self, event: GestureEvent) {
        let Some(canvas) = self.canvas.as_ref() else {
            tracing::debug!(?event, "dropping gesture: no display target");
            return;
        };
        let container = self.settings.container_width();
        match event {
            GestureEvent::Drag { dx, dy } => {
                self.viewport.apply_drag(Vec2::new(dx, dy), canvas, container);
            }
            GestureEvent::Wheel { offset_y } => {
                self.viewport.apply_zoom(offset_y, canvas, container);
            }
        }
    }

    /// Resolves the current state into the crop request a commit would
    /// dispatch. Gated on both monitors and an image being present.
    pub fn resolve_placement(&self) -> Result<CropRequest, SessionError> {
        let canvas = self.canvas.as_ref().ok_or(CanvasError::EmptyMonitorSet)?;
        let request = placement::resolve(&self.viewport, canvas, self.settings.container_width())?;
        Ok(request)
    }
}
