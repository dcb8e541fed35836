//! spanpaper - span one wallpaper image across every monitor
//!
//! The core of the crate is a viewport/layout engine: monitor geometries are
//! normalized into a single virtual canvas, a pan/zoom viewport is kept
//! clamped against that canvas, and on commit the viewport is resolved into
//! the exact crop each monitor needs. Platform collaborators (xrandr for
//! enumeration, xwallpaper for the actual write) live behind the `platform`
//! module and are the only places that touch the outside world.

pub mod app;
pub mod config;
pub mod domain;
pub mod platform;
pub mod ui;
