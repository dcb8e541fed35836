//! Bezel configuration
//!
//! Bezels are supplied by the user as `LEFT,TOP;LEFT,TOP;...` in pixels,
//! one entry per monitor from left to right. Monitors without an entry get
//! zero bezels; values are clamped to a sane maximum before they reach the
//! geometry.

use std::str::FromStr;

use thiserror::Error;

use crate::domain::monitor::MonitorDescriptor;

/// Upper limit for a single bezel value in pixels.
pub const MAX_BEZEL_PX: u32 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BezelError {
    #[error("malformed bezel entry '{entry}': expected LEFT,TOP in pixels")]
    Malformed { entry: String },
}

/// Ordered per-monitor (left, top) bezel widths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BezelSpec {
    pairs: Vec<(u32, u32)>,
}

impl BezelSpec {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Writes the bezel values onto the monitors, in enumeration order.
    /// Extra entries are ignored, missing entries leave zero bezels.
    pub fn apply(&self, monitors: &mut [MonitorDescriptor]) {
        for (monitor, &(left, top)) in monitors.iter_mut().zip(&self.pairs) {
            monitor.bezel_x = left.min(MAX_BEZEL_PX);
            monitor.bezel_y = top.min(MAX_BEZEL_PX);
        }
    }
}

impl FromStr for BezelSpec {
    type Err = BezelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();
        for entry in s.split(';').filter(|entry| !entry.trim().is_empty()) {
            let malformed = || BezelError::Malformed {
                entry: entry.to_string(),
            };
            let (left, top) = entry.split_once(',').ok_or_else(malformed)?;
            let left = left.trim().parse().map_err(|_| malformed())?;
            let top = top.trim().parse().map_err(|_| malformed())?;
            pairs.push((left, top));
        }
        Ok(Self { pairs })
    }
}
