//! 24-bit uncompressed BMP: header codec and pixel transcoder.
//!
//! Only the 14-byte file header followed by a 40-byte BITMAPINFOHEADER is
//! understood. Pixel rows are read and written without 4-byte alignment
//! padding, so files whose `3 * width` is not a multiple of 4 are treated as
//! tightly packed.

pub mod header;
pub mod transcode;

pub use header::{
    FileHeader, InfoHeader, decode_file_header, decode_headers, decode_info_header,
    derive_output_headers, encode, validate,
};
pub use transcode::{SampleReader, TransformStream, transform_reader, transform_stream};
