//! Pixel and image model shared by the codec and every transform.
//!
//! An [`Image`] owns a row-major buffer of exactly `rows * cols` [`Pixel`]s.
//! The extents are private so the buffer length can never drift from them;
//! resizing means building a new `Image`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image dimensions must be positive, got {rows} rows x {cols} cols")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("pixel buffer holds {actual} pixels, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("out of memory allocating {pixels} pixels")]
    OutOfMemory { pixels: usize },
}

/// One RGB sample, 8 bits per channel, no alpha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    pub const WHITE: Pixel = Pixel::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in wire order (R, G, B).
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Pixel {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Row-major 2D pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    rows: usize,
    cols: usize,
    data: Vec<Pixel>,
}

/// Reserve room for `rows * cols` pixels without aborting on allocation failure.
pub(crate) fn alloc_pixels(rows: usize, cols: usize) -> Result<Vec<Pixel>, ImageError> {
    if rows == 0 || cols == 0 {
        return Err(ImageError::InvalidDimensions { rows, cols });
    }
    let pixels = rows
        .checked_mul(cols)
        .ok_or(ImageError::OutOfMemory { pixels: usize::MAX })?;
    let mut data = Vec::new();
    data.try_reserve_exact(pixels)
        .map_err(|_| ImageError::OutOfMemory { pixels })?;
    Ok(data)
}

impl Image {
    /// A `rows x cols` image filled with `fill`.
    pub fn filled(rows: usize, cols: usize, fill: Pixel) -> Result<Self, ImageError> {
        let mut data = alloc_pixels(rows, cols)?;
        data.resize(rows * cols, fill);
        Ok(Self { rows, cols, data })
    }

    /// A `rows x cols` black image.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ImageError> {
        Self::filled(rows, cols, Pixel::BLACK)
    }

    /// Wrap an existing row-major buffer.
    pub fn from_pixels(rows: usize, cols: usize, data: Vec<Pixel>) -> Result<Self, ImageError> {
        if rows == 0 || cols == 0 {
            return Err(ImageError::InvalidDimensions { rows, cols });
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or(ImageError::InvalidDimensions { rows, cols })?;
        if data.len() != expected {
            return Err(ImageError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build an image by evaluating `f(row, col)` for every position.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> Pixel,
    ) -> Result<Self, ImageError> {
        let mut data = alloc_pixels(rows, cols)?;
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed image; present for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.data
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    /// Pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        (row < self.rows && col < self.cols).then(|| self.data[self.index(row, col)])
    }

    /// Pixel at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Pixel {
        assert!(row < self.rows && col < self.cols, "pixel ({row}, {col}) out of bounds");
        self.data[self.index(row, col)]
    }

    /// Overwrite the pixel at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, pixel: Pixel) {
        assert!(row < self.rows && col < self.cols, "pixel ({row}, {col}) out of bounds");
        let k = self.index(row, col);
        self.data[k] = pixel;
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> &[Pixel] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }
}
