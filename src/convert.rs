//! Header-then-pixels conversion over caller-owned streams.

use std::io::{self, Read, Write};

use enough::Stop;

use crate::bmp::header::{
    self, FILE_HEADER_SIZE, FileHeader, HEADERS_SIZE, INFO_HEADER_SIZE, InfoHeader,
};
use crate::bmp::transcode::{SampleReader, TransformStream, transform_reader};
use crate::error::{BitmapError, FormatError};
use crate::limits::Limits;
use crate::pixel::{SAMPLE_BYTES, sample_to_bytes};

/// Output is handed to the writer in chunks of this many bytes.
const WRITE_CHUNK: usize = 64 * 1024;

/// Headers of an input that passed validation, with the reader positioned at
/// the first pixel sample.
pub struct Conversion<R> {
    reader: R,
    input: (FileHeader, InfoHeader),
    output: (FileHeader, InfoHeader),
}

/// Read up to `len` bytes, stopping early only at end of input.
fn read_header_bytes(reader: &mut impl Read, len: usize) -> Result<Vec<u8>, BitmapError> {
    let mut buf = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

impl<R: Read> Conversion<R> {
    /// Decode and validate both headers, then skip to the pixel data.
    ///
    /// The file header is decoded before the info header is read, so a
    /// non-BMP input reports [`FormatError::BadMagic`] even when it is shorter
    /// than 54 bytes.
    pub fn open(mut reader: R, limits: Option<&Limits>) -> Result<Self, BitmapError> {
        let file_bytes = read_header_bytes(&mut reader, FILE_HEADER_SIZE)?;
        let file = header::decode_file_header(&file_bytes)?;
        let info_bytes = read_header_bytes(&mut reader, INFO_HEADER_SIZE)?;
        let info = header::decode_info_header(&info_bytes)?;

        log::debug!(
            "decoded BMP: {}x{}, depth {}, compression {}, bitmap size {}, offset {}",
            info.width,
            info.height,
            info.color_depth,
            info.compression,
            info.bitmap_size,
            file.bitmap_offset
        );

        header::validate(&info)?;
        if let Some(limits) = limits {
            limits.check(&info)?;
        }
        let output = header::derive_output_headers(&file, &info)?;

        let offset = file.bitmap_offset;
        if (offset as usize) < HEADERS_SIZE {
            return Err(FormatError::PixelOffsetInsideHeader(offset).into());
        }
        let gap = u64::from(offset) - HEADERS_SIZE as u64;
        if gap > 0 {
            log::trace!("skipping {gap} bytes between headers and pixel data");
            let skipped = io::copy(&mut reader.by_ref().take(gap), &mut io::sink())?;
            if skipped < gap && info.pixel_count() > 0 {
                return Err(BitmapError::TruncatedData {
                    expected: info.pixel_count(),
                    actual: 0,
                });
            }
        }

        Ok(Self {
            reader,
            input: (file, info),
            output,
        })
    }

    /// Headers as read from the input.
    pub fn input_headers(&self) -> (&FileHeader, &InfoHeader) {
        (&self.input.0, &self.input.1)
    }

    /// Headers to write in front of the converted pixels.
    pub fn output_headers(&self) -> (&FileHeader, &InfoHeader) {
        (&self.output.0, &self.output.1)
    }

    /// Encoded output headers.
    pub fn output_header_bytes(&self) -> [u8; HEADERS_SIZE] {
        header::encode(&self.output.0, &self.output.1)
    }

    /// Samples the image declares (width * height).
    pub fn pixel_count(&self) -> u64 {
        self.input.1.pixel_count()
    }

    /// The grayscale samples, read lazily from the remaining input.
    pub fn into_samples(self) -> TransformStream<SampleReader<R>> {
        let info = self.input.1;
        transform_reader(self.reader, info.width, info.height)
    }

    /// Write the output headers and the grayscale pixel data to `writer`,
    /// returning the number of samples written.
    ///
    /// `stop` is checked before anything is written and again every 16 rows.
    /// `progress` receives `(samples_done, samples_total)` after every sample.
    /// On error the writer may hold a partial file.
    pub fn write_to<W: Write>(
        self,
        mut writer: W,
        stop: impl Stop,
        mut progress: Option<&mut dyn FnMut(u64, u64)>,
    ) -> Result<u64, BitmapError> {
        stop.check()?;
        writer.write_all(&self.output_header_bytes())?;

        let total = self.pixel_count();
        let row_check = u64::from(self.input.1.width).saturating_mul(16).max(1);
        let mut buf = Vec::with_capacity(WRITE_CHUNK);
        let mut samples = self.into_samples();

        while let Some(sample) = samples.next() {
            buf.extend_from_slice(&sample_to_bytes(sample?));
            if buf.len() + SAMPLE_BYTES > WRITE_CHUNK {
                writer.write_all(&buf)?;
                buf.clear();
            }
            let done = samples.produced();
            if done % row_check == 0 {
                // rows before a cancellation point always reach the writer
                writer.write_all(&buf)?;
                buf.clear();
                stop.check()?;
            }
            if let Some(progress) = progress.as_mut() {
                progress(done, total);
            }
        }
        writer.write_all(&buf)?;
        writer.flush()?;
        Ok(samples.produced())
    }
}

/// Result of a finished conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertSummary {
    pub input_header: FileHeader,
    pub input_info: InfoHeader,
    pub output_header: FileHeader,
    pub output_info: InfoHeader,
    /// Pixel samples written.
    pub samples: u64,
}

/// Builder for a grayscale conversion.
///
/// ```no_run
/// use bmpgray::{ConvertRequest, Limits, Unstoppable};
///
/// let input = std::fs::File::open("in.bmp")?;
/// let output = std::fs::File::create("in.bmp.grayscale.bmp")?;
/// let limits = Limits { max_pixels: Some(100_000_000), ..Default::default() };
/// let summary = ConvertRequest::new()
///     .with_limits(&limits)
///     .convert(input, std::io::BufWriter::new(output), Unstoppable)?;
/// println!("{} samples", summary.samples);
/// # Ok::<(), bmpgray::BitmapError>(())
/// ```
#[derive(Default)]
pub struct ConvertRequest<'a> {
    limits: Option<&'a Limits>,
    progress: Option<&'a mut dyn FnMut(u64, u64)>,
}

impl<'a> ConvertRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject images larger than `limits` before any output is written.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Called with `(samples_done, samples_total)` after every sample.
    pub fn with_progress(mut self, progress: &'a mut dyn FnMut(u64, u64)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Convert `reader` into `writer`.
    ///
    /// The derived headers are written before any pixel data. On error the
    /// writer may hold a partial file; discarding it is up to the caller.
    pub fn convert<R: Read, W: Write>(
        self,
        reader: R,
        writer: W,
        stop: impl Stop,
    ) -> Result<ConvertSummary, BitmapError> {
        let conversion = Conversion::open(reader, self.limits)?;
        let (input_header, input_info) = conversion.input;
        let (output_header, output_info) = conversion.output;
        let samples = conversion.write_to(writer, stop, self.progress)?;

        Ok(ConvertSummary {
            input_header,
            input_info,
            output_header,
            output_info,
            samples,
        })
    }
}

/// Convert a BMP stream to grayscale with no limits or progress reporting.
pub fn convert<R: Read, W: Write>(
    reader: R,
    writer: W,
    stop: impl Stop,
) -> Result<ConvertSummary, BitmapError> {
    ConvertRequest::new().convert(reader, writer, stop)
}

/// Convert an in-memory BMP file, returning the output file bytes.
pub fn convert_bytes(data: &[u8], stop: impl Stop) -> Result<Vec<u8>, BitmapError> {
    let mut out = Vec::new();
    convert(data, &mut out, stop)?;
    Ok(out)
}
