//! Streaming grayscale transcoder for 24-bit pixel data.
//!
//! Samples are produced in the order they are stored. No vertical flip is done
//! and no row padding is read; a 24-bit row is taken to be exactly
//! `3 * width` bytes.

use core::iter::FusedIterator;
use std::io::{ErrorKind, Read};

use crate::error::BitmapError;
use crate::pixel::{ColorSample, SAMPLE_BYTES, gray_sample, sample_from_bytes};

/// Reads consecutive 3-byte samples from a byte stream.
///
/// Ends at end of input; a trailing partial sample is dropped. Other read
/// failures are yielded once as [`BitmapError::Io`], after which the reader
/// ends.
pub struct SampleReader<R> {
    inner: R,
    done: bool,
}

impl<R: Read> SampleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn read_sample(&mut self) -> Result<Option<ColorSample>, BitmapError> {
        let mut buf = [0u8; SAMPLE_BYTES];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(Some(sample_from_bytes(buf))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read> Iterator for SampleReader<R> {
    type Item = Result<ColorSample, BitmapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_sample() {
            Ok(Some(sample)) => Some(Ok(sample)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for SampleReader<R> {}

/// Lazy grayscale stream over exactly `width * height` source samples.
///
/// Created by [`transform_stream`].
pub struct TransformStream<I> {
    source: I,
    expected: u64,
    produced: u64,
    finished: bool,
}

/// Turn a sequence of source samples into the grayscale sequence for a
/// `width` x `height` image.
///
/// The returned iterator yields one gray sample per source sample, stopping
/// after `width * height`. If the source runs out first, it yields a single
/// [`BitmapError::TruncatedData`] and then ends. Source errors are passed on
/// once and also end the stream.
pub fn transform_stream<I>(samples: I, width: u32, height: u32) -> TransformStream<I::IntoIter>
where
    I: IntoIterator<Item = Result<ColorSample, BitmapError>>,
{
    TransformStream {
        source: samples.into_iter(),
        expected: u64::from(width) * u64::from(height),
        produced: 0,
        finished: false,
    }
}

impl<I> TransformStream<I> {
    /// Samples yielded so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Total samples the image declares.
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Give back the source iterator.
    pub fn into_source(self) -> I {
        self.source
    }
}

impl<I> Iterator for TransformStream<I>
where
    I: Iterator<Item = Result<ColorSample, BitmapError>>,
{
    type Item = Result<ColorSample, BitmapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.produced == self.expected {
            return None;
        }
        match self.source.next() {
            Some(Ok(sample)) => {
                self.produced += 1;
                Some(Ok(gray_sample(sample)))
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                Some(Err(BitmapError::TruncatedData {
                    expected: self.expected,
                    actual: self.produced,
                }))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = usize::try_from(self.expected - self.produced).unwrap_or(usize::MAX);
        // A truncated source still yields one trailing error item.
        (remaining.min(1), Some(remaining))
    }
}

impl<I> FusedIterator for TransformStream<I> where
    I: Iterator<Item = Result<ColorSample, BitmapError>>
{
}

/// Gray stream reading its samples straight from a byte stream.
pub fn transform_reader<R: Read>(
    reader: R,
    width: u32,
    height: u32,
) -> TransformStream<SampleReader<R>> {
    transform_stream(SampleReader::new(reader), width, height)
}
