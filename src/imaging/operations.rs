//! The six pixel transforms.
//!
//! `binarize` rewrites its input in place. Every other operation borrows the
//! source read-only and returns a freshly allocated [`Image`]. All argument
//! checks run before any pixel is touched or any buffer is allocated.

use super::calculations::{
    GaussianKernel, in_disc, kernel_size, luminance, rotate_left_target,
};
use super::params::{CropRect, PointillismParams};
use crate::error::ErrorKind;
use crate::types::{Image, ImageError, Pixel, alloc_pixels};
use log::debug;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("threshold {0} is outside 0..=255")]
    InvalidThreshold(i64),
    #[error("crop {rect} exceeds image of {rows} rows x {cols} cols")]
    CropOutOfBounds {
        rect: CropRect,
        rows: usize,
        cols: usize,
    },
    #[error("crop {rect} is empty or inverted")]
    EmptyCrop { rect: CropRect },
    #[error("blur sigma {0} yields no kernel (10 * sigma must be at least 1)")]
    InvalidSigma(f32),
    #[error(
        "invalid pointillism parameters: density {density_percent}% (1-100), max radius {max_radius} (>= 1)"
    )]
    InvalidPointillism {
        density_percent: u32,
        max_radius: u32,
    },
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CropOutOfBounds { .. } => ErrorKind::OutOfBounds,
            Self::InvalidThreshold(_)
            | Self::EmptyCrop { .. }
            | Self::InvalidSigma(_)
            | Self::InvalidPointillism { .. } => ErrorKind::InvalidArgument,
            Self::Image(ImageError::OutOfMemory { .. }) => ErrorKind::OutOfMemory,
            Self::Image(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Fallible copy of `source`, so a huge canvas surfaces as OutOfMemory.
fn copy_image(source: &Image) -> Result<Image> {
    let mut data = alloc_pixels(source.rows(), source.cols())?;
    data.extend_from_slice(source.pixels());
    Ok(Image::from_pixels(source.rows(), source.cols(), data)?)
}

/// Replace every pixel with pure black or white by comparing its luminance
/// against `threshold` (black when strictly below).
pub fn binarize(image: &mut Image, threshold: i64) -> Result<()> {
    if !(0..=255).contains(&threshold) {
        return Err(TransformError::InvalidThreshold(threshold));
    }
    for p in image.pixels_mut() {
        *p = if i64::from(luminance(*p)) < threshold {
            Pixel::BLACK
        } else {
            Pixel::WHITE
        };
    }
    Ok(())
}

/// Copy the rectangle `rect` out of `image`.
///
/// Bounds are checked before shape: a rectangle that is both out of bounds
/// and inverted reports [`TransformError::CropOutOfBounds`].
pub fn crop(image: &Image, rect: CropRect) -> Result<Image> {
    let rows = image.rows() as i64;
    let cols = image.cols() as i64;
    if rect.lower_row > rows || rect.lower_col > cols || rect.upper_row < 0 || rect.upper_col < 0
    {
        return Err(TransformError::CropOutOfBounds {
            rect,
            rows: image.rows(),
            cols: image.cols(),
        });
    }
    if rect.lower_col <= rect.upper_col || rect.lower_row <= rect.upper_row {
        return Err(TransformError::EmptyCrop { rect });
    }

    // All four corners are now within 0..=extent, so the casts are lossless.
    let (top, left) = (rect.upper_row as usize, rect.upper_col as usize);
    let height = (rect.lower_row - rect.upper_row) as usize;
    let width = (rect.lower_col - rect.upper_col) as usize;

    let mut data = alloc_pixels(height, width)?;
    for i in 0..height {
        data.extend_from_slice(&image.row(top + i)[left..left + width]);
    }
    Ok(Image::from_pixels(height, width, data)?)
}

/// Double both dimensions, copying each pixel into a 2x2 block.
pub fn zoom_in(image: &Image) -> Result<Image> {
    let rows = image
        .rows()
        .checked_mul(2)
        .ok_or(ImageError::OutOfMemory { pixels: usize::MAX })?;
    let cols = image
        .cols()
        .checked_mul(2)
        .ok_or(ImageError::OutOfMemory { pixels: usize::MAX })?;
    Ok(Image::from_fn(rows, cols, |i, j| image.at(i / 2, j / 2))?)
}

/// Rotate 90° counter-clockwise. Rows and columns swap.
pub fn rotate_left(image: &Image) -> Result<Image> {
    let mut out = Image::new(image.cols(), image.rows())?;
    for i in 0..image.rows() {
        for (j, &p) in image.row(i).iter().enumerate() {
            let (r, c) = rotate_left_target(i, j, image.cols());
            out.set(r, c, p);
        }
    }
    Ok(out)
}

/// Paint randomly placed discs in the color of their center pixel.
///
/// Every pixel independently becomes a seed with probability
/// `density_percent / 100`; each seed draws a radius in `1..=max_radius`.
/// Disc colors always come from the untouched source, and discs painted by
/// later seeds (row-major order) cover earlier ones.
pub fn pointillism<R: Rng + ?Sized>(
    image: &Image,
    params: &PointillismParams,
    rng: &mut R,
) -> Result<Image> {
    if !params.is_valid() {
        return Err(TransformError::InvalidPointillism {
            density_percent: params.density_percent,
            max_radius: params.max_radius,
        });
    }

    let rows = image.rows() as i64;
    let cols = image.cols() as i64;
    let mut canvas = copy_image(image)?;
    let mut seeds = 0usize;

    for i in 0..rows {
        for j in 0..cols {
            if rng.gen_range(1..=100u32) > params.density_percent {
                continue;
            }
            seeds += 1;
            let radius = i64::from(rng.gen_range(1..=params.max_radius));
            let color = image.at(i as usize, j as usize);

            for m in (i - radius).max(0)..=(i + radius).min(rows - 1) {
                for n in (j - radius).max(0)..=(j + radius).min(cols - 1) {
                    if in_disc(m - i, n - j, radius) {
                        canvas.set(m as usize, n as usize, color);
                    }
                }
            }
        }
    }

    debug!(
        "pointillism painted {seeds} discs over {}x{}",
        image.rows(),
        image.cols()
    );
    Ok(canvas)
}

// Weighted averages of identical channels can land a few ulps under the
// integer; this keeps them from truncating one step low.
const TRUNCATION_SLACK: f64 = 1e-6;

#[inline]
fn to_channel(weighted: f64, total: f64) -> u8 {
    (weighted / total + TRUNCATION_SLACK) as u8
}

/// Gaussian blur with a `(10 * sigma)`-wide odd square kernel.
///
/// Near the border only the kernel cells that land inside the image
/// contribute, and the result is normalised by the sum of those weights.
pub fn blur(image: &Image, sigma: f32) -> Result<Image> {
    let kernel = match GaussianKernel::new(sigma) {
        Some(k) => k,
        None if kernel_size(sigma).is_none() => {
            return Err(TransformError::InvalidSigma(sigma));
        }
        None => {
            return Err(ImageError::OutOfMemory {
                pixels: usize::MAX,
            }
            .into());
        }
    };
    debug!(
        "blur sigma={} kernel={}x{} over {}x{}",
        sigma,
        kernel.size(),
        kernel.size(),
        image.rows(),
        image.cols()
    );

    let rows = image.rows();
    let cols = image.cols();
    let center = kernel.center();
    let mut data = alloc_pixels(rows, cols)?;

    for i in 0..rows {
        let row_support = kernel.support(i, rows);
        for j in 0..cols {
            let col_support = kernel.support(j, cols);
            let (mut total, mut r, mut g, mut b) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);

            for m in row_support.clone() {
                let src_row = image.row(i + m - center);
                for l in col_support.clone() {
                    let w = kernel.weight(m, l);
                    let p = src_row[j + l - center];
                    total += w;
                    r += f64::from(p.r) * w;
                    g += f64::from(p.g) * w;
                    b += f64::from(p.b) * w;
                }
            }

            data.push(Pixel::new(
                to_channel(r, total),
                to_channel(g, total),
                to_channel(b, total),
            ));
        }
    }

    Ok(Image::from_pixels(rows, cols, data)?)
}
