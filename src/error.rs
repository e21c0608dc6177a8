//! Flat error taxonomy.
//!
//! Each module keeps its own `thiserror` enum with the detail a human needs
//! (offending values, byte counts). [`ErrorKind`] collapses all of them into
//! the handful of categories a caller branches on, e.g. the CLI when it picks
//! an exit status.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Magic tag is not `P6`.
    InvalidFormat,
    /// Max channel value other than 255.
    UnsupportedColorDepth,
    /// Non-positive or over-limit row/column counts.
    InvalidDimensions,
    /// A header number could not be parsed.
    MalformedHeader,
    /// Fewer pixel bytes than the header promises.
    TruncatedData,
    /// The output sink rejected or shortened a write.
    WriteFailed,
    /// A transform argument outside its domain.
    InvalidArgument,
    /// A crop rectangle reaching outside the image.
    OutOfBounds,
    /// An output buffer could not be allocated.
    OutOfMemory,
    /// Configuration file unreadable or invalid.
    Config,
}

impl ErrorKind {
    /// True for every kind raised while reading the input image.
    pub fn is_decode(self) -> bool {
        matches!(
            self,
            Self::InvalidFormat
                | Self::UnsupportedColorDepth
                | Self::InvalidDimensions
                | Self::MalformedHeader
                | Self::TruncatedData
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid-format",
            Self::UnsupportedColorDepth => "unsupported-color-depth",
            Self::InvalidDimensions => "invalid-dimensions",
            Self::MalformedHeader => "malformed-header",
            Self::TruncatedData => "truncated-data",
            Self::WriteFailed => "write-failed",
            Self::InvalidArgument => "invalid-argument",
            Self::OutOfBounds => "out-of-bounds",
            Self::OutOfMemory => "out-of-memory",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
