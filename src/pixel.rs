//! Color samples and the grayscale weighting.

/// One 24-bit BMP pixel, fields in on-disk byte order (blue, green, red).
pub type ColorSample = rgb::Bgr<u8>;

/// Bytes per stored sample.
pub const SAMPLE_BYTES: usize = 3;

pub(crate) const RED_WEIGHT: f64 = 0.1;
pub(crate) const GREEN_WEIGHT: f64 = 0.6;
pub(crate) const BLUE_WEIGHT: f64 = 0.3;

/// Grayscale value of a sample: `0.1 * red + 0.6 * green + 0.3 * blue`,
/// truncated toward zero.
///
/// The weights do not sum to exactly 1.0 and are kept as they are; output must
/// stay byte-identical to files produced by earlier versions of this tool.
#[inline]
pub fn grayscale(sample: ColorSample) -> u8 {
    let value = RED_WEIGHT * f64::from(sample.r)
        + GREEN_WEIGHT * f64::from(sample.g)
        + BLUE_WEIGHT * f64::from(sample.b);
    // `as` saturates and truncates; value is always within 0.0..=255.0
    value as u8
}

/// The sample with its grayscale value replicated into all three channels.
#[inline]
pub fn gray_sample(sample: ColorSample) -> ColorSample {
    let v = grayscale(sample);
    ColorSample { b: v, g: v, r: v }
}

/// Read a sample from its 3 stored bytes.
#[inline]
pub fn sample_from_bytes(bytes: [u8; SAMPLE_BYTES]) -> ColorSample {
    let [b, g, r] = bytes;
    ColorSample { b, g, r }
}

/// The 3 stored bytes of a sample.
#[inline]
pub fn sample_to_bytes(sample: ColorSample) -> [u8; SAMPLE_BYTES] {
    [sample.b, sample.g, sample.r]
}
