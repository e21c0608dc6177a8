//! Shared test utilities: small synthetic images and raw PPM byte builders.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let img = gradient(4, 4);
//! let bytes = ppm_bytes("P6\n1 1\n255\n", &[255, 0, 0]);
//! ```

use crate::types::{Image, Pixel};

// =========================================================================
// Image builders
// =========================================================================

/// Every pixel distinct (for images up to 256 x 256), so misplaced pixels show up.
pub fn gradient(rows: usize, cols: usize) -> Image {
    Image::from_fn(rows, cols, |i, j| {
        Pixel::new(i as u8, j as u8, (i * 7 + j * 13) as u8)
    })
    .unwrap()
}

/// Single-color image.
pub fn uniform(rows: usize, cols: usize, color: Pixel) -> Image {
    Image::filled(rows, cols, color).unwrap()
}

// =========================================================================
// Byte builders
// =========================================================================

/// Concatenate a textual header and a raw raster.
pub fn ppm_bytes(header: &str, raster: &[u8]) -> Vec<u8> {
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(raster);
    bytes
}
