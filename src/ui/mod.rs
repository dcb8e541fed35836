//! Preview rendering surface
//!
//! Only the renderer lives here: visual chrome belongs to whatever front
//! end embeds the engine.

pub mod renderer;

pub use renderer::{PreviewLayout, PreviewRenderer, RendererError};
