//! # pixmanip
//!
//! Decode a binary PPM (`P6`) image, apply one deterministic (or seeded)
//! pixel transform, and encode the result back to `P6`.
//!
//! # Architecture: Three Steps
//!
//! ```text
//! 1. Decode     bytes  →  Image     (strict header validation)
//! 2. Transform  Image  →  Image     (binarize, crop, zoom-in, rotate-left,
//!                                    pointillism, blur)
//! 3. Encode     Image  →  bytes     (bit-exact P6 layout)
//! ```
//!
//! Each step is a plain function over owned values, so unit tests exercise
//! the transforms without touching the filesystem, and the codec is tested
//! against in-memory byte buffers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Pixel` and `Image`, the row-major pixel buffer |
//! | [`ppm`] | P6 decoder and encoder |
//! | [`imaging`] | The six transforms and their pure helper math |
//! | [`process`] | Decode → transform → encode, the entry point a driver calls |
//! | [`error`] | `ErrorKind`, the flat taxonomy every error maps onto |
//! | [`config`] | `pixmanip.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Typed Errors, Not Status Integers
//!
//! Every fallible function returns a `Result` whose error carries the
//! offending values and maps onto exactly one [`error::ErrorKind`]. "Wrote
//! zero bytes" and "failed" can never be confused, and the CLI chooses exit
//! statuses by matching on kinds rather than on magic numbers.
//!
//! ## Owned Images
//!
//! An [`types::Image`] frees its buffer when dropped. Transforms that produce
//! a new image take `&Image` and return a fresh one; `binarize` takes
//! `&mut Image`. Buffers are reserved with `try_reserve_exact`, so an absurd
//! header or zoom surfaces as `OutOfMemory` instead of aborting.
//!
//! ## Injectable Randomness
//!
//! Pointillism takes any `rand::Rng`. Production runs seed from OS entropy;
//! tests and `--seed` use a seeded `StdRng`, which makes the output
//! reproducible byte for byte.

pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod ppm;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::ErrorKind;
pub use types::{Image, Pixel};
