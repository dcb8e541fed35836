//! Monitor enumeration via xrandr
//!
//! This module is responsible for:
//! - Running `xrandr --query` and collecting its output
//! - Parsing connected outputs into monitor descriptors
//! - Dropping outputs whose geometry or physical size is unusable
//!
//! Parsing tolerates partially-broken outputs: a projector that reports no
//! physical size, or a connected-but-off output without a mode, is skipped
//! so the rest of the set stays usable.

use std::process::Command;

use thiserror::Error;

use crate::domain::monitor::MonitorDescriptor;

/// Errors that can occur while enumerating monitors
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to run xrandr: {0}")]
    CommandFailed(#[from] std::io::Error),

    #[error("xrandr exited with {status}")]
    QueryFailed { status: std::process::ExitStatus },

    #[error("no usable monitors in xrandr output")]
    NoMonitors,
}

/// Enumerates connected monitors in the order xrandr reports them.
///
/// That order is what determines each monitor's place on the virtual
/// canvas, so it is passed through untouched.
pub fn enumerate_monitors() -> Result<Vec<MonitorDescriptor>, MonitorError> {
    let output = Command::new("xrandr").arg("--query").output()?;
    if !output.status.success() {
        return Err(MonitorError::QueryFailed {
            status: output.status,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let monitors = parse_monitors(&stdout);
    if monitors.is_empty() {
        return Err(MonitorError::NoMonitors);
    }

    tracing::info!(count = monitors.len(), "enumerated monitors");
    Ok(monitors)
}

/// Parses `xrandr --query` output into monitor descriptors.
///
/// Pure function over the query text; outputs that are disconnected or
/// missing usable data are skipped.
pub fn parse_monitors(output: &str) -> Vec<MonitorDescriptor> {
    output.lines().filter_map(parse_connected_line).collect()
}

/// Parses one output line of the form
/// `NAME connected [primary] WxH+X+Y [rotation] (...) PWmm x PHmm`.
fn parse_connected_line(line: &str) -> Option<MonitorDescriptor> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let name = *tokens.first()?;
    if tokens.get(1) != Some(&"connected") {
        return None;
    }

    // Geometry sits right after "connected", or one later when the output
    // is marked primary. Connected-but-off outputs have no geometry token.
    let geometry_token = match tokens.get(2) {
        Some(&"primary") => tokens.get(3)?,
        Some(token) => token,
        None => return None,
    };
    let Some((pixel_width, pixel_height, x, y)) = parse_geometry(geometry_token) else {
        tracing::warn!(output = name, "skipping output without a usable mode");
        return None;
    };

    // Physical size trails the line as "PWmm x PHmm".
    let Some((physical_width_mm, physical_height_mm)) = parse_physical_size(&tokens) else {
        tracing::warn!(output = name, "skipping output without a physical size");
        return None;
    };
    if pixel_width == 0 || pixel_height == 0 || physical_height_mm <= 0.0 {
        tracing::warn!(output = name, "skipping output with degenerate geometry");
        return None;
    }

    Some(MonitorDescriptor {
        name: name.to_string(),
        pixel_width,
        pixel_height,
        physical_width_mm,
        physical_height_mm,
        x,
        y,
        bezel_x: 0,
        bezel_y: 0,
    })
}

/// Parses `WxH+X+Y`; X and Y may carry their own sign after the `+`.
fn parse_geometry(token: &str) -> Option<(u32, u32, i32, i32)> {
    let (size, position) = token.split_once('+')?;
    let (width, height) = size.split_once('x')?;
    let (x, y) = position.split_once('+')?;
    Some((
        width.parse().ok()?,
        height.parse().ok()?,
        x.parse().ok()?,
        y.parse().ok()?,
    ))
}

fn parse_physical_size(tokens: &[&str]) -> Option<(f64, f64)> {
    let n = tokens.len();
    if n < 3 || tokens[n - 2] != "x" {
        return None;
    }
    Some((
        parse_millimetres(tokens[n - 3])?,
        parse_millimetres(tokens[n - 1])?,
    ))
}

fn parse_millimetres(token: &str) -> Option<f64> {
    token.strip_suffix("mm")?.parse().ok()
}
