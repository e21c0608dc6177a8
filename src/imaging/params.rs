//! Parameter types for the transforms.
//!
//! These structs describe *what* to do, not *how*. They are the interface
//! between the driver (which parses command-line text into them) and
//! [`operations`](super::operations) (which does the pixel work).
//!
//! ## Types
//!
//! - [`CropRect`]: half-open rectangle in source row/column space. Signed, so
//!   a negative corner reaches the operation and is reported as out of bounds.
//! - [`PointillismParams`]: seed density and maximum disc radius.
//! - [`Operation`]: one fully-specified transform, ready to apply.

use std::fmt;

/// Crop rectangle covering rows `upper_row..lower_row` and columns
/// `upper_col..lower_col` of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub upper_col: i64,
    pub upper_row: i64,
    pub lower_col: i64,
    pub lower_row: i64,
}

impl CropRect {
    /// Argument order matches the command line: upper-left column and row,
    /// then lower-right column and row.
    pub fn new(upper_col: i64, upper_row: i64, lower_col: i64, lower_row: i64) -> Self {
        Self {
            upper_col,
            upper_row,
            lower_col,
            lower_row,
        }
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.upper_row, self.lower_row, self.upper_col, self.lower_col
        )
    }
}

/// Pointillism tuning.
///
/// - `density_percent`: chance, out of 100, that a pixel becomes a seed point
/// - `max_radius`: disc radius is drawn uniformly from `1..=max_radius`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointillismParams {
    pub density_percent: u32,
    pub max_radius: u32,
}

impl Default for PointillismParams {
    fn default() -> Self {
        Self {
            density_percent: 3,
            max_radius: 5,
        }
    }
}

impl PointillismParams {
    pub fn is_valid(&self) -> bool {
        (1..=100).contains(&self.density_percent) && self.max_radius >= 1
    }
}

/// A transform with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Black/white by luminance threshold (0–255).
    Binarize { threshold: i64 },
    /// Cut out a rectangle.
    Crop(CropRect),
    /// 2x nearest-neighbour upscale.
    ZoomIn,
    /// 90° counter-clockwise rotation.
    RotateLeft,
    /// Random painted discs.
    Pointillism(PointillismParams),
    /// Gaussian blur with the given sigma.
    Blur { sigma: f32 },
}

impl Operation {
    /// Command-line name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binarize { .. } => "binarize",
            Self::Crop(_) => "crop",
            Self::ZoomIn => "zoom-in",
            Self::RotateLeft => "rotate-left",
            Self::Pointillism(_) => "pointillism",
            Self::Blur { .. } => "blur",
        }
    }

    /// True for the operations that modify the image in place.
    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::Binarize { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointillism_defaults() {
        let p = PointillismParams::default();
        assert_eq!(p.density_percent, 3);
        assert_eq!(p.max_radius, 5);
        assert!(p.is_valid());
    }

    #[test]
    fn pointillism_validity_bounds() {
        let p = |density_percent, max_radius| PointillismParams {
            density_percent,
            max_radius,
        };
        assert!(p(100, 1).is_valid());
        assert!(!p(0, 5).is_valid());
        assert!(!p(101, 5).is_valid());
        assert!(!p(3, 0).is_valid());
    }

    #[test]
    fn crop_rect_argument_order() {
        let r = CropRect::new(1, 2, 3, 4);
        assert_eq!(r.upper_col, 1);
        assert_eq!(r.upper_row, 2);
        assert_eq!(r.lower_col, 3);
        assert_eq!(r.lower_row, 4);
        assert_eq!(r.to_string(), "rows 2..4, cols 1..3");
    }

    #[test]
    fn operation_names() {
        assert_eq!(Operation::ZoomIn.name(), "zoom-in");
        assert_eq!(Operation::Blur { sigma: 1.0 }.name(), "blur");
        assert!(Operation::Binarize { threshold: 1 }.is_in_place());
        assert!(!Operation::RotateLeft.is_in_place());
    }
}
