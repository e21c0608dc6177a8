//! Pixel transforms: pure Rust, single-threaded.
//!
//! | Operation | Output | Arguments |
//! |---|---|---|
//! | **binarize** | in place | threshold 0–255 |
//! | **crop** | new, `h x w` of the rectangle | [`CropRect`] |
//! | **zoom-in** | new, `2 rows x 2 cols` | none |
//! | **rotate-left** | new, `cols x rows` | none |
//! | **pointillism** | new, same size | [`PointillismParams`] + an `Rng` |
//! | **blur** | new, same size | sigma |
//!
//! The module is split into:
//! - **Calculations**: pure arithmetic (luminance, kernel, disc, rotation index)
//! - **Parameters**: data structures describing a transform
//! - **Operations**: the transforms themselves, plus [`TransformError`]

mod calculations;
pub mod operations;
mod params;

pub use calculations::{GaussianKernel, kernel_size, luminance};
pub use operations::{
    TransformError, binarize, blur, crop, pointillism, rotate_left, zoom_in,
};
pub use params::{CropRect, Operation, PointillismParams};
