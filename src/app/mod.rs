//! Application orchestration layer
//!
//! This module coordinates between the CLI, domain and platform layers.
//! The session holds the interactive state; the controller connects it to
//! the collaborators that touch the outside world.

pub mod controller;
pub mod session;
