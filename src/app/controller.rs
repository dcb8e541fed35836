//! Application controller and coordination layer
//!
//! The controller wires the platform collaborators to the session: it
//! bootstraps from the live monitor list, forwards placement commands and
//! performs the commit. The session itself never talks to xrandr,
//! xwallpaper or the renderer.

use std::path::Path;

use thiserror::Error;

use crate::app::session::{GestureEvent, Session, SessionError};
use crate::config::{BezelSpec, PreviewSettings};
use crate::domain::monitor::MonitorDescriptor;
use crate::domain::viewport::WHEEL_ZOOM_DIVISOR;
use crate::platform::wallpaper::{self, DispatchError};
use crate::platform::xrandr::{self, MonitorError};
use crate::ui::renderer::{PreviewRenderer, RendererError};

/// Errors surfaced to the binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Monitors(#[from] MonitorError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Renderer(#[from] RendererError),
}

pub struct Controller {
    session: Session,
}

impl Controller {
    /// Enumerates the live monitors, applies bezels and opens a session.
    pub fn bootstrap(bezels: &BezelSpec, settings: PreviewSettings) -> Result<Self, AppError> {
        let mut monitors = xrandr::enumerate_monitors()?;
        bezels.apply(&mut monitors);
        Ok(Self::with_monitors(monitors, settings))
    }

    /// Opens a session over an already-known monitor list.
    pub fn with_monitors(monitors: Vec<MonitorDescriptor>, settings: PreviewSettings) -> Self {
        let mut session = Session::new(settings);
        session.set_monitors(monitors);
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn load_image(&mut self, path: &Path) -> Result<(), AppError> {
        self.session.load_image(path)?;
        Ok(())
    }

    /// Pans the image by a container-pixel delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.session.apply_gesture(GestureEvent::Drag { dx, dy });
    }

    /// Applies a target zoom factor by converting it to the wheel offset
    /// that produces it. Factors below 1 land on the floor of 1.
    pub fn apply_zoom_factor(&mut self, zoom: f64) {
        let offset_y = (1.0 - zoom) * WHEEL_ZOOM_DIVISOR;
        self.session.apply_gesture(GestureEvent::Wheel { offset_y });
    }

    /// Renders the current placement into a preview PNG.
    pub fn write_preview(&self, out: &Path) -> Result<(), AppError> {
        let renderer = PreviewRenderer::new();
        let pixmap = renderer.render(&self.session)?;
        renderer.save_png(&pixmap, out)?;
        tracing::info!(out = %out.display(), "wrote placement preview");
        Ok(())
    }

    /// Resolves the current placement and hands every monitor its slice.
    pub fn set_wallpaper(&self) -> Result<(), AppError> {
        let request = self.session.resolve_placement()?;
        tracing::info!(
            scale = request.scale,
            top = request.top,
            left = request.left,
            "committing placement"
        );
        wallpaper::set_wallpaper(&request, self.session.monitors())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn monitors() -> Vec<MonitorDescriptor> {
        vec![
            MonitorDescriptor {
                name: "DP-1".to_string(),
                pixel_width: 1920,
                pixel_height: 1080,
                physical_width_mm: 531.0,
                physical_height_mm: 299.0,
                x: 0,
                y: 0,
                bezel_x: 0,
                bezel_y: 0,
            },
            MonitorDescriptor {
                name: "HDMI-1".to_string(),
                pixel_width: 1080,
                pixel_height: 1920,
                physical_width_mm: 336.0,
                physical_height_mm: 597.0,
                x: 1920,
                y: 0,
                bezel_x: 0,
                bezel_y: 0,
            },
        ]
    }

    #[test]
    fn zoom_factor_round_trips_through_the_wheel_mapping() {
        let mut controller = Controller::with_monitors(monitors(), PreviewSettings::default());
        controller
            .session
            .install_image(Path::new("wall.png"), DynamicImage::new_rgba8(1500, 1200));

        controller.apply_zoom_factor(2.0);
        assert_eq!(controller.session().viewport().zoom(), 2.0);

        controller.apply_zoom_factor(0.5);
        assert_eq!(controller.session().viewport().zoom(), 1.0);
    }

    #[test]
    fn pan_is_clamped_through_the_session() {
        let mut controller = Controller::with_monitors(monitors(), PreviewSettings::default());
        controller
            .session
            .install_image(Path::new("wall.png"), DynamicImage::new_rgba8(1500, 1200));
        controller.apply_zoom_factor(2.0);
        controller.pan(-1e6, -1e6);

        let offset = controller.session().viewport().offset();
        assert_eq!(offset.x, 1500.0 - 3000.0);
        assert_eq!(offset.y, 960.0 - 2400.0);
    }
}
