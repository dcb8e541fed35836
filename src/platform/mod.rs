//! Platform collaborators
//!
//! This module encapsulates everything that touches the outside world on
//! X11: monitor enumeration through xrandr and the actual wallpaper write
//! through xwallpaper. The rest of the crate only sees plain data in and
//! out of these functions.

pub mod wallpaper;
pub mod xrandr;
