//! Binary PPM (`P6`) codec.
//!
//! ## Layout
//!
//! ```text
//! P6\n
//! <cols> <rows>\n
//! 255\n
//! <rows * cols pixels, 3 raw bytes each (R, G, B), row-major, no padding>
//! ```
//!
//! The reader accepts any run of whitespace between header tokens and skips
//! `#` comment lines before each number. Exactly one whitespace byte separates
//! the max-value field from the pixel data, so a first pixel byte that happens
//! to be `\n` or `' '` is not swallowed. The writer never emits comments.
//!
//! Decoding is all-or-nothing: either a complete [`Image`] comes back or an
//! error does.

use crate::error::ErrorKind;
use crate::types::{Image, ImageError, Pixel, alloc_pixels};
use log::debug;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

/// Magic tag of the binary pixmap variant.
pub const MAGIC: &str = "P6";

/// The only max-channel value this codec handles.
pub const MAX_CHANNEL_VALUE: i64 = 255;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("not a binary PPM: expected tag 'P6', found '{found}'")]
    InvalidFormat { found: String },
    #[error("unsupported max channel value {found}, only 255 is supported")]
    UnsupportedColorDepth { found: i64 },
    #[error("invalid dimensions {cols}x{rows}: both must be positive")]
    InvalidDimensions { cols: i64, rows: i64 },
    #[error("image of {pixels} pixels exceeds the configured limit of {limit}")]
    DimensionsExceedLimit { pixels: u64, limit: u64 },
    #[error("malformed header: could not read {field}")]
    MalformedHeader { field: &'static str },
    #[error("truncated pixel data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },
    #[error("failed to read image: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write image: {0}")]
    WriteFailed(#[source] io::Error),
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::UnsupportedColorDepth { .. } => ErrorKind::UnsupportedColorDepth,
            Self::InvalidDimensions { .. } | Self::DimensionsExceedLimit { .. } => {
                ErrorKind::InvalidDimensions
            }
            Self::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            // An unreadable stream yields no pixels; report it the same way.
            Self::TruncatedData { .. } | Self::Read(_) => ErrorKind::TruncatedData,
            Self::WriteFailed(_) => ErrorKind::WriteFailed,
            Self::Image(ImageError::OutOfMemory { .. }) => ErrorKind::OutOfMemory,
            Self::Image(ImageError::InvalidDimensions { .. }) => ErrorKind::InvalidDimensions,
            Self::Image(ImageError::BufferLength { .. }) => ErrorKind::TruncatedData,
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Decoder knobs. The default accepts any size that fits in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Refuse headers promising more than this many pixels.
    pub max_pixels: Option<u64>,
}

/// Parsed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub cols: usize,
    pub rows: usize,
}

impl Header {
    pub fn pixel_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// Decode a P6 image with default options.
pub fn decode<R: BufRead>(reader: R) -> Result<Image> {
    decode_with(reader, &DecodeOptions::default())
}

/// Decode a P6 image.
pub fn decode_with<R: BufRead>(mut reader: R, options: &DecodeOptions) -> Result<Image> {
    let header = read_header(&mut reader, options)?;
    let expected = header.pixel_count() * 3;

    // Reserve up front so an absurd header fails as OutOfMemory rather than
    // aborting; the reads below never grow the buffer past `expected`.
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(expected)
        .map_err(|_| ImageError::OutOfMemory {
            pixels: header.pixel_count(),
        })?;
    (&mut reader)
        .take(expected as u64)
        .read_to_end(&mut bytes)
        .map_err(CodecError::Read)?;
    if bytes.len() < expected {
        return Err(CodecError::TruncatedData {
            expected,
            actual: bytes.len(),
        });
    }

    let mut pixels = alloc_pixels(header.rows, header.cols)?;
    pixels.extend(
        bytes
            .chunks_exact(3)
            .map(|c| Pixel::new(c[0], c[1], c[2])),
    );
    debug!("decoded {}x{} P6 image", header.cols, header.rows);
    Ok(Image::from_pixels(header.rows, header.cols, pixels)?)
}

/// Read and validate the header, leaving `reader` at the first pixel byte.
pub fn read_header<R: BufRead>(reader: &mut R, options: &DecodeOptions) -> Result<Header> {
    skip_whitespace(reader)?;
    let tag = read_token(reader)?;
    if tag != MAGIC.as_bytes() {
        return Err(CodecError::InvalidFormat {
            found: String::from_utf8_lossy(&tag).into_owned(),
        });
    }

    // Columns first: X size, then Y size.
    let cols = read_number(reader, "column count")?;
    let rows = read_number(reader, "row count")?;
    let max = read_number(reader, "max channel value")?;

    if max != MAX_CHANNEL_VALUE {
        return Err(CodecError::UnsupportedColorDepth { found: max });
    }
    if cols <= 0 || rows <= 0 {
        return Err(CodecError::InvalidDimensions { cols, rows });
    }
    let (cols_u, rows_u) = match (usize::try_from(cols), usize::try_from(rows)) {
        (Ok(c), Ok(r)) => (c, r),
        _ => return Err(CodecError::InvalidDimensions { cols, rows }),
    };
    let pixels = cols_u
        .checked_mul(rows_u)
        .filter(|p| p.checked_mul(3).is_some())
        .ok_or(CodecError::InvalidDimensions { cols, rows })?;
    if let Some(limit) = options.max_pixels {
        if pixels as u64 > limit {
            return Err(CodecError::DimensionsExceedLimit {
                pixels: pixels as u64,
                limit,
            });
        }
    }

    // Exactly one separator byte before the raster.
    match peek(reader)? {
        Some(b) if b.is_ascii_whitespace() => reader.consume(1),
        Some(_) => {
            return Err(CodecError::MalformedHeader {
                field: "max channel value",
            });
        }
        None => {
            return Err(CodecError::TruncatedData {
                expected: pixels * 3,
                actual: 0,
            });
        }
    }

    Ok(Header {
        cols: cols_u,
        rows: rows_u,
    })
}

fn peek<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    let buf = reader.fill_buf().map_err(CodecError::Read)?;
    Ok(buf.first().copied())
}

fn skip_whitespace<R: BufRead>(reader: &mut R) -> Result<()> {
    while let Some(b) = peek(reader)? {
        if !b.is_ascii_whitespace() {
            break;
        }
        reader.consume(1);
    }
    Ok(())
}

/// Discard `#` comment lines and the whitespace around them.
fn skip_comments<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        skip_whitespace(reader)?;
        if peek(reader)? != Some(b'#') {
            return Ok(());
        }
        let mut discard = Vec::new();
        reader
            .read_until(b'\n', &mut discard)
            .map_err(CodecError::Read)?;
    }
}

fn read_token<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut token = Vec::new();
    while let Some(b) = peek(reader)? {
        if b.is_ascii_whitespace() {
            break;
        }
        token.push(b);
        reader.consume(1);
    }
    Ok(token)
}

/// Read one optionally signed decimal integer, skipping comments before it.
fn read_number<R: BufRead>(reader: &mut R, field: &'static str) -> Result<i64> {
    skip_comments(reader)?;
    let mut digits = String::new();
    if let Some(sign @ (b'-' | b'+')) = peek(reader)? {
        digits.push(sign as char);
        reader.consume(1);
    }
    while let Some(b) = peek(reader)? {
        if !b.is_ascii_digit() {
            break;
        }
        digits.push(b as char);
        reader.consume(1);
    }
    digits
        .parse::<i64>()
        .map_err(|_| CodecError::MalformedHeader { field })
}

/// Write `image` as P6, returning the number of bytes written.
///
/// Any I/O failure, including a sink that accepts zero bytes, surfaces as
/// [`CodecError::WriteFailed`].
pub fn encode<W: Write>(image: &Image, mut writer: W) -> Result<usize> {
    let header = format!(
        "{}\n{} {}\n{}\n",
        MAGIC,
        image.cols(),
        image.rows(),
        MAX_CHANNEL_VALUE
    );
    let raster: Vec<u8> = image.pixels().iter().flat_map(|p| p.to_bytes()).collect();

    writer
        .write_all(header.as_bytes())
        .and_then(|()| writer.write_all(&raster))
        .and_then(|()| writer.flush())
        .map_err(CodecError::WriteFailed)?;

    debug!(
        "encoded {}x{} P6 image ({} bytes)",
        image.cols(),
        image.rows(),
        header.len() + raster.len()
    );
    Ok(header.len() + raster.len())
}

/// Encode into a fresh byte vector.
pub fn encode_to_vec(image: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + image.len() * 3);
    // Writing into a Vec cannot fail.
    let _ = encode(image, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient, ppm_bytes};
    use std::io::Cursor;

    fn decode_bytes(bytes: &[u8]) -> Result<Image> {
        decode(Cursor::new(bytes))
    }

    #[test]
    fn encode_writes_exact_header_and_raster() {
        let img = Image::from_pixels(1, 2, vec![Pixel::new(1, 2, 3), Pixel::new(4, 5, 6)]).unwrap();
        let bytes = encode_to_vec(&img);
        assert_eq!(bytes, b"P6\n2 1\n255\n\x01\x02\x03\x04\x05\x06");
    }

    #[test]
    fn encode_reports_byte_count() {
        let img = gradient(3, 4);
        let mut out = Vec::new();
        let n = encode(&img, &mut out).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(n, "P6\n4 3\n255\n".len() + 3 * 4 * 3);
    }

    #[test]
    fn decode_roundtrips_encoded_image() {
        let img = gradient(5, 7);
        let back = decode_bytes(&encode_to_vec(&img)).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn decode_skips_comments_between_tokens() {
        let bytes = ppm_bytes("P6\n# made by hand\n2 # trailing\n# another\n1\n#x\n255\n", &[7; 6]);
        let img = decode_bytes(&bytes).unwrap();
        assert_eq!((img.rows(), img.cols()), (1, 2));
        assert_eq!(img.pixels(), &[Pixel::new(7, 7, 7); 2]);
    }

    #[test]
    fn decode_keeps_whitespace_valued_first_pixel() {
        let bytes = ppm_bytes("P6\n1 1\n255\n", b"\n \t");
        let img = decode_bytes(&bytes).unwrap();
        assert_eq!(img.at(0, 0), Pixel::new(b'\n', b' ', b'\t'));
    }

    #[test]
    fn decode_rejects_wrong_magic() {
        let err = decode_bytes(b"P3\n1 1\n255\n\0\0\0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        let err = decode_bytes(b"P66\n1 1\n255\n\0\0\0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        let err = decode_bytes(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn decode_rejects_color_depth_other_than_255() {
        let err = decode_bytes(b"P6\n1 1\n65535\n\0\0\0\0\0\0").unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedColorDepth { found: 65535 }));
        assert_eq!(err.kind(), ErrorKind::UnsupportedColorDepth);
    }

    #[test]
    fn color_depth_checked_before_dimensions() {
        let err = decode_bytes(b"P6\n0 0\n15\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedColorDepth);
    }

    #[test]
    fn decode_rejects_non_positive_dimensions() {
        for header in ["P6\n0 3\n255\n", "P6\n3 0\n255\n", "P6\n-2 3\n255\n"] {
            let err = decode_bytes(header.as_bytes()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDimensions, "{header:?}");
        }
    }

    #[test]
    fn decode_rejects_unparsable_numbers() {
        let err = decode_bytes(b"P6\nwide 3\n255\n").unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedHeader {
                field: "column count"
            }
        ));
        let err = decode_bytes(b"P6\n3").unwrap_err();
        assert!(matches!(err, CodecError::MalformedHeader { field: "row count" }));
        let err = decode_bytes(b"P6\n3 3\n255x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn decode_rejects_short_raster() {
        let bytes = ppm_bytes("P6\n2 2\n255\n", &[0; 11]);
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TruncatedData {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn decode_missing_separator_is_truncated() {
        let err = decode_bytes(b"P6\n2 2\n255").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut bytes = ppm_bytes("P6\n1 1\n255\n", &[1, 2, 3]);
        bytes.extend_from_slice(b"garbage");
        let img = decode_bytes(&bytes).unwrap();
        assert_eq!(img.at(0, 0), Pixel::new(1, 2, 3));
    }

    #[test]
    fn decode_enforces_pixel_limit() {
        let bytes = ppm_bytes("P6\n4 4\n255\n", &[0; 48]);
        let options = DecodeOptions {
            max_pixels: Some(15),
        };
        let err = decode_with(Cursor::new(&bytes), &options).unwrap_err();
        assert!(matches!(
            err,
            CodecError::DimensionsExceedLimit {
                pixels: 16,
                limit: 15
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidDimensions);

        let options = DecodeOptions {
            max_pixels: Some(16),
        };
        assert!(decode_with(Cursor::new(&bytes), &options).is_ok());
    }

    #[test]
    fn header_leaves_reader_at_raster() {
        let bytes = ppm_bytes("P6 3\t2 255 ", &[9; 18]);
        let mut cursor = Cursor::new(&bytes);
        let header = read_header(&mut cursor, &DecodeOptions::default()).unwrap();
        assert_eq!(header, Header { cols: 3, rows: 2 });
        assert_eq!(cursor.position() as usize, bytes.len() - 18);
    }

    struct ShortSink {
        budget: usize,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_is_write_failed() {
        let img = gradient(4, 4);
        let err = encode(&img, ShortSink { budget: 20 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailed);
    }
}
