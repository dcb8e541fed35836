//! Configuration module for spanpaper
//!
//! Concentrates the user-facing knobs shared between the CLI and the
//! session: bezel widths and preview sizing. Everything is validated and
//! clamped here so the geometry below never sees wild values.

pub mod bezels;
pub mod preview;

pub use bezels::{BezelError, BezelSpec};
pub use preview::PreviewSettings;
