//! # bmpgray
//!
//! Validating reader for 24-bit uncompressed BMP files that rewrites them in
//! grayscale.
//!
//! ## What is checked
//!
//! - `BM` signature
//! - color depth is 24 and compression is `BI_RGB`
//! - the bitmap size field equals `3 * width * height`
//!
//! The output keeps width, height, resolution and reserved fields, puts the
//! pixel data straight after the 54 header bytes and rewrites the size, plane
//! and palette fields to match.
//!
//! ## Grayscale
//!
//! Each pixel becomes `0.1 * red + 0.6 * green + 0.3 * blue`, truncated, and
//! that value is written to all three channels. Rows keep their stored order.
//!
//! ## Non-Goals
//!
//! - Compressed, paletted, 16-bit or 32-bit BMPs
//! - V4/V5 and OS/2 headers
//! - Row padding: rows are read and written as exactly `3 * width` bytes
//!
//! ## Usage
//!
//! ```no_run
//! use bmpgray::{Unstoppable, convert_bytes};
//!
//! let data = std::fs::read("photo.bmp")?;
//! let gray = convert_bytes(&data, Unstoppable)?;
//! std::fs::write("photo.bmp.grayscale.bmp", gray)?;
//! # Ok::<(), bmpgray::BitmapError>(())
//! ```
//!
//! For streaming, [`ConvertRequest`] works on any `Read`/`Write` pair, and
//! [`Conversion`] exposes the validated headers and the lazy sample stream for
//! callers that want to drive output themselves.

#![forbid(unsafe_code)]

mod convert;
mod error;
mod limits;
mod pixel;

pub mod bmp;

// Re-exports
pub use bmp::{FileHeader, InfoHeader, SampleReader, TransformStream, transform_stream};
pub use convert::{Conversion, ConvertRequest, ConvertSummary, convert, convert_bytes};
pub use enough::{Stop, Unstoppable};
pub use error::{BitmapError, FormatError};
pub use limits::Limits;
pub use pixel::{ColorSample, gray_sample, grayscale, sample_from_bytes, sample_to_bytes};
