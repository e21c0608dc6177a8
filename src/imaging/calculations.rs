//! Pure calculation functions for the transforms.
//!
//! Nothing here touches an [`Image`](crate::types::Image); every function is a
//! small piece of arithmetic that the operations combine, so each can be unit
//! tested in isolation.

use crate::types::Pixel;
use std::f64::consts::PI;

/// Grayscale intensity of a pixel using fixed NTSC weights.
///
/// `0.30 R + 0.59 G + 0.11 B`, truncated toward zero.
///
/// # Examples
/// ```
/// # use pixmanip::imaging::luminance;
/// # use pixmanip::types::Pixel;
/// assert_eq!(luminance(Pixel::new(0, 0, 0)), 0);
/// // 88.5 + 0.55 = 89.05 → 89
/// assert_eq!(luminance(Pixel::new(0, 150, 5)), 89);
/// ```
pub fn luminance(p: Pixel) -> u8 {
    (0.3 * f64::from(p.r) + 0.59 * f64::from(p.g) + 0.11 * f64::from(p.b)) as u8
}

/// Side length of the square Gaussian kernel for `sigma`.
///
/// `10 * sigma` truncated toward zero, bumped to the next odd number when even.
/// Returns `None` when the truncated value is not positive (including NaN and
/// infinite sigma), since no kernel can be built from it.
///
/// # Examples
/// ```
/// # use pixmanip::imaging::kernel_size;
/// assert_eq!(kernel_size(0.5), Some(5));
/// assert_eq!(kernel_size(1.0), Some(11));
/// assert_eq!(kernel_size(0.05), None);
/// ```
pub fn kernel_size(sigma: f32) -> Option<usize> {
    if !sigma.is_finite() {
        return None;
    }
    let n = (10.0_f32 * sigma) as i64;
    if n <= 0 {
        return None;
    }
    let n = if n % 2 == 0 { n + 1 } else { n };
    usize::try_from(n).ok()
}

/// Square Gaussian kernel, row-major, centered at `(center, center)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    size: usize,
    center: usize,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Build the kernel for `sigma`, or `None` if [`kernel_size`] rejects it or
    /// the weight table cannot be allocated.
    ///
    /// The exponent is evaluated in single precision and the normalisation
    /// factor in double precision.
    pub fn new(sigma: f32) -> Option<Self> {
        let size = kernel_size(sigma)?;
        let center = size / 2;
        let len = size.checked_mul(size)?;
        let mut weights = Vec::new();
        weights.try_reserve_exact(len).ok()?;

        let sigma_sq = sigma * sigma;
        let scale = 1.0 / (2.0 * PI * f64::from(sigma_sq));
        for i in 0..size {
            for j in 0..size {
                let dx = i.abs_diff(center) as i64;
                let dy = j.abs_diff(center) as i64;
                let exponent = -((dx * dx + dy * dy) as f32) / (2.0 * sigma_sq);
                weights.push(scale * f64::from(exponent).exp());
            }
        }

        Some(Self {
            size,
            center,
            weights,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn center(&self) -> usize {
        self.center
    }

    /// Weight at kernel row `m`, column `l`.
    #[inline]
    pub fn weight(&self, m: usize, l: usize) -> f64 {
        self.weights[m * self.size + l]
    }

    /// Kernel rows `m` whose source row `pos - center + m` lies in `0..extent`.
    pub fn support(&self, pos: usize, extent: usize) -> std::ops::Range<usize> {
        let start = self.center.saturating_sub(pos);
        let end = (extent + self.center).saturating_sub(pos).min(self.size);
        start..end.max(start)
    }
}

/// Whether offset `(dm, dn)` from a disc center lies within `radius`.
#[inline]
pub fn in_disc(dm: i64, dn: i64, radius: i64) -> bool {
    dm * dm + dn * dn <= radius * radius
}

/// Destination of source pixel `(i, j)` under a 90° counter-clockwise
/// rotation of an image with `cols` columns.
#[inline]
pub fn rotate_left_target(i: usize, j: usize, cols: usize) -> (usize, usize) {
    (cols - 1 - j, i)
}
