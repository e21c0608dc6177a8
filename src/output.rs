//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Transform
//!
//! ```text
//! rotate-left: 480x640 -> 640x480
//!     Wrote 921615 bytes
//! ```
//!
//! Dimensions are shown as `rows x cols`.
//!
//! ## Inspect
//!
//! ```text
//! cols = 640, rows = 480
//!     Pixels: 307200
//!     Raster: 921600 bytes
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.

use crate::process::{Dimensions, ProcessOutcome};
use crate::types::Image;
use serde::Serialize;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims(d: Dimensions) -> String {
    format!("{}x{}", d.rows, d.cols)
}

// ============================================================================
// Transform output
// ============================================================================

/// Format the summary of a completed transform.
pub fn format_outcome(outcome: &ProcessOutcome) -> Vec<String> {
    vec![
        format!(
            "{}: {} -> {}",
            outcome.operation,
            dims(outcome.input),
            dims(outcome.output)
        ),
        format!("{}Wrote {} bytes", indent(1), outcome.bytes_written),
    ]
}

pub fn print_outcome(outcome: &ProcessOutcome) {
    for line in format_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect output
// ============================================================================

/// Header facts about a decoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub cols: usize,
    pub rows: usize,
    pub pixels: usize,
    pub raster_bytes: usize,
}

impl From<&Image> for ImageInfo {
    fn from(image: &Image) -> Self {
        Self {
            cols: image.cols(),
            rows: image.rows(),
            pixels: image.len(),
            raster_bytes: image.len() * 3,
        }
    }
}

/// Format inspection output, leading with the classic `cols = C, rows = R` line.
pub fn format_inspect(info: &ImageInfo) -> Vec<String> {
    vec![
        format!("cols = {}, rows = {}", info.cols, info.rows),
        format!("{}Pixels: {}", indent(1), info.pixels),
        format!("{}Raster: {} bytes", indent(1), info.raster_bytes),
    ]
}

pub fn print_inspect(info: &ImageInfo) {
    for line in format_inspect(info) {
        println!("{}", line);
    }
}
