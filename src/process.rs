//! Decode → transform → encode.
//!
//! This is the boundary a driver calls. The driver owns the byte streams and
//! turns command-line text into an [`Operation`]; everything between reading
//! the first header byte and flushing the last pixel happens here.
//!
//! ## Flow
//!
//! ```text
//! reader ──decode──▶ Image ──apply(op)──▶ Image ──encode──▶ writer
//! ```
//!
//! Nothing is written to the sink until the transform has succeeded, so an
//! argument error never leaves a half-written output behind.

use crate::config::ToolConfig;
use crate::error::ErrorKind;
use crate::imaging::{
    Operation, TransformError, binarize, blur, crop, pointillism, rotate_left, zoom_in,
};
use crate::ppm::{self, CodecError};
use crate::types::Image;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::io::{BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec(e) => e.kind(),
            Self::Transform(e) => e.kind(),
        }
    }
}

/// Row and column extents of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

impl From<&Image> for Dimensions {
    fn from(image: &Image) -> Self {
        Self {
            rows: image.rows(),
            cols: image.cols(),
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub operation: &'static str,
    pub input: Dimensions,
    pub output: Dimensions,
    pub bytes_written: usize,
}

/// Random source for pointillism: the configured seed when present,
/// OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Apply `op` to an owned image and return the result.
///
/// In-place operations hand the same image back; the rest allocate a new one
/// and drop the input.
pub fn apply<R: Rng + ?Sized>(
    mut image: Image,
    op: &Operation,
    rng: &mut R,
) -> Result<Image, TransformError> {
    debug!(
        "applying {} to {}x{} image",
        op.name(),
        image.rows(),
        image.cols()
    );
    match op {
        Operation::Binarize { threshold } => {
            binarize(&mut image, *threshold)?;
            Ok(image)
        }
        Operation::Crop(rect) => crop(&image, *rect),
        Operation::ZoomIn => zoom_in(&image),
        Operation::RotateLeft => rotate_left(&image),
        Operation::Pointillism(params) => pointillism(&image, params, rng),
        Operation::Blur { sigma } => blur(&image, *sigma),
    }
}

/// Apply `op` to `image` and encode the result into `sink`.
pub fn run<W: Write, R: Rng + ?Sized>(
    image: Image,
    op: &Operation,
    rng: &mut R,
    sink: W,
) -> Result<ProcessOutcome, ProcessError> {
    let input = Dimensions::from(&image);
    let result = apply(image, op, rng)?;
    let bytes_written = ppm::encode(&result, sink)?;
    Ok(ProcessOutcome {
        operation: op.name(),
        input,
        output: Dimensions::from(&result),
        bytes_written,
    })
}

/// Full pipeline over byte streams, using `config` for decode limits and
/// pointillism seeding.
pub fn process<R: BufRead, W: Write>(
    reader: R,
    sink: W,
    op: &Operation,
    config: &ToolConfig,
) -> Result<ProcessOutcome, ProcessError> {
    let image = ppm::decode_with(reader, &config.decode.options())?;
    let mut rng = rng_from_seed(config.pointillism.seed);
    run(image, op, &mut rng, sink)
}
