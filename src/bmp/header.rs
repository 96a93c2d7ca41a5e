//! BMP file header and BITMAPINFOHEADER codec.
//!
//! Every field is read and written individually in little-endian order; the
//! layouts below are the on-disk byte offsets, not Rust struct layouts.

use crate::error::{BitmapError, FormatError};

/// Size of the BITMAPFILEHEADER.
pub const FILE_HEADER_SIZE: usize = 14;
/// Size of the BITMAPINFOHEADER.
pub const INFO_HEADER_SIZE: usize = 40;
/// Both headers, which is also where output pixel data starts.
pub const HEADERS_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// The `BM` signature.
pub const MAGIC: [u8; 2] = *b"BM";

/// `BI_RGB`, the only compression code accepted.
pub const BI_RGB: u32 = 0;
pub const BI_RLE8: u32 = 1;
pub const BI_RLE4: u32 = 2;

/// The only accepted color depth.
pub const SUPPORTED_DEPTH: u16 = 24;

/// Palette size written to output headers, meaning full 24-bit color.
pub const FULL_COLOR_COUNT: u32 = 0x00FF_FFFF;

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], BitmapError> {
        let end = self.pos.checked_add(N).ok_or(BitmapError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(BitmapError::UnexpectedEof)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        self.pos = end;
        Ok(buf)
    }

    fn get_u16_le(&mut self) -> Result<u16, BitmapError> {
        Ok(u16::from_le_bytes(self.read_fixed_bytes()?))
    }

    fn get_u32_le(&mut self) -> Result<u32, BitmapError> {
        Ok(u32::from_le_bytes(self.read_fixed_bytes()?))
    }
}

// ── Headers ─────────────────────────────────────────────────────────

/// The 14-byte BITMAPFILEHEADER.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 2],
    /// Byte length of the whole file.
    pub total_size: u32,
    /// Two reserved u16 fields, passed through untouched.
    pub reserved: [u8; 4],
    /// Offset from the start of the file to the pixel data.
    pub bitmap_offset: u32,
}

/// The 40-byte BITMAPINFOHEADER.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: u32,
    /// Row count. Read unsigned; negative (top-down) heights are not handled.
    pub height: u32,
    pub color_planes: u16,
    pub color_depth: u16,
    pub compression: u32,
    /// Byte length of the pixel data.
    pub bitmap_size: u32,
    /// Pixels per meter.
    pub x_resolution: u32,
    pub y_resolution: u32,
    pub colors: u32,
    pub important_colors: u32,
}

impl FileHeader {
    /// Encode into the 14-byte on-disk layout.
    pub fn write_to(&self, out: &mut [u8; FILE_HEADER_SIZE]) {
        out[0..2].copy_from_slice(&self.magic);
        out[2..6].copy_from_slice(&self.total_size.to_le_bytes());
        out[6..10].copy_from_slice(&self.reserved);
        out[10..14].copy_from_slice(&self.bitmap_offset.to_le_bytes());
    }
}

impl InfoHeader {
    /// Encode into the 40-byte on-disk layout.
    pub fn write_to(&self, out: &mut [u8; INFO_HEADER_SIZE]) {
        out[0..4].copy_from_slice(&self.size.to_le_bytes());
        out[4..8].copy_from_slice(&self.width.to_le_bytes());
        out[8..12].copy_from_slice(&self.height.to_le_bytes());
        out[12..14].copy_from_slice(&self.color_planes.to_le_bytes());
        out[14..16].copy_from_slice(&self.color_depth.to_le_bytes());
        out[16..20].copy_from_slice(&self.compression.to_le_bytes());
        out[20..24].copy_from_slice(&self.bitmap_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.x_resolution.to_le_bytes());
        out[28..32].copy_from_slice(&self.y_resolution.to_le_bytes());
        out[32..36].copy_from_slice(&self.colors.to_le_bytes());
        out[36..40].copy_from_slice(&self.important_colors.to_le_bytes());
    }

    /// Number of samples in the pixel data.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pixel data byte length implied by the dimensions (3 bytes per pixel, no
    /// row padding).
    pub fn expected_bitmap_size(&self) -> u64 {
        self.pixel_count() * 3
    }
}

/// Decode the file header from the first 14 bytes of `data`.
pub fn decode_file_header(data: &[u8]) -> Result<FileHeader, BitmapError> {
    let mut cursor = Cursor::new(data);
    let magic = cursor.read_fixed_bytes::<2>()?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic.into());
    }
    Ok(FileHeader {
        magic,
        total_size: cursor.get_u32_le()?,
        reserved: cursor.read_fixed_bytes::<4>()?,
        bitmap_offset: cursor.get_u32_le()?,
    })
}

/// Decode the info header from the 40 bytes that follow the file header.
///
/// `data` starts at the info header, not at the start of the file. The magic is
/// not checked here; decode the file header first.
pub fn decode_info_header(data: &[u8]) -> Result<InfoHeader, BitmapError> {
    let mut cursor = Cursor::new(data);
    Ok(InfoHeader {
        size: cursor.get_u32_le()?,
        width: cursor.get_u32_le()?,
        height: cursor.get_u32_le()?,
        color_planes: cursor.get_u16_le()?,
        color_depth: cursor.get_u16_le()?,
        compression: cursor.get_u32_le()?,
        bitmap_size: cursor.get_u32_le()?,
        x_resolution: cursor.get_u32_le()?,
        y_resolution: cursor.get_u32_le()?,
        colors: cursor.get_u32_le()?,
        important_colors: cursor.get_u32_le()?,
    })
}

/// Decode both headers from the start of a file.
pub fn decode_headers(data: &[u8]) -> Result<(FileHeader, InfoHeader), BitmapError> {
    let file = decode_file_header(data)?;
    let info = decode_info_header(data.get(FILE_HEADER_SIZE..).unwrap_or_default())?;
    Ok((file, info))
}

/// Check that the info header describes an image this crate can convert.
///
/// Checks run in a fixed order (depth, compression, size consistency) and the
/// first failure is reported.
pub fn validate(info: &InfoHeader) -> Result<(), FormatError> {
    if info.color_depth != SUPPORTED_DEPTH {
        return Err(FormatError::UnsupportedColorDepth(info.color_depth));
    }
    if info.compression != BI_RGB {
        return Err(FormatError::UnsupportedCompression(info.compression));
    }
    let expected = info.expected_bitmap_size();
    if u64::from(info.bitmap_size) != expected {
        return Err(FormatError::SizeMismatch {
            declared: info.bitmap_size,
            expected,
        });
    }
    Ok(())
}

/// Compute the headers written in front of the grayscale pixel data.
///
/// Dimensions, resolutions, depth and reserved bytes carry over; sizes,
/// offset and palette fields are rewritten.
pub fn derive_output_headers(
    file: &FileHeader,
    info: &InfoHeader,
) -> Result<(FileHeader, InfoHeader), BitmapError> {
    let too_large = || BitmapError::DimensionsTooLarge {
        width: info.width,
        height: info.height,
    };
    let bitmap_size = u32::try_from(info.expected_bitmap_size()).map_err(|_| too_large())?;
    let total_size = bitmap_size
        .checked_add(HEADERS_SIZE as u32)
        .ok_or_else(too_large)?;

    let out_file = FileHeader {
        total_size,
        bitmap_offset: HEADERS_SIZE as u32,
        ..*file
    };
    let out_info = InfoHeader {
        size: INFO_HEADER_SIZE as u32,
        color_planes: 1,
        compression: BI_RGB,
        bitmap_size,
        colors: FULL_COLOR_COUNT,
        important_colors: 0,
        ..*info
    };
    Ok((out_file, out_info))
}

/// Encode both headers into their 54-byte on-disk form.
pub fn encode(file: &FileHeader, info: &InfoHeader) -> [u8; HEADERS_SIZE] {
    let mut file_bytes = [0u8; FILE_HEADER_SIZE];
    let mut info_bytes = [0u8; INFO_HEADER_SIZE];
    file.write_to(&mut file_bytes);
    info.write_to(&mut info_bytes);

    let mut out = [0u8; HEADERS_SIZE];
    out[..FILE_HEADER_SIZE].copy_from_slice(&file_bytes);
    out[FILE_HEADER_SIZE..].copy_from_slice(&info_bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_headers() -> [u8; HEADERS_SIZE] {
        let mut h = [0u8; HEADERS_SIZE];
        h[0..2].copy_from_slice(b"BM");
        h[2..6].copy_from_slice(&66u32.to_le_bytes());
        h[6..10].copy_from_slice(&[1, 2, 3, 4]);
        h[10..14].copy_from_slice(&54u32.to_le_bytes());
        h[14..18].copy_from_slice(&40u32.to_le_bytes());
        h[18..22].copy_from_slice(&2u32.to_le_bytes());
        h[22..26].copy_from_slice(&2u32.to_le_bytes());
        h[26..28].copy_from_slice(&1u16.to_le_bytes());
        h[28..30].copy_from_slice(&24u16.to_le_bytes());
        h[34..38].copy_from_slice(&12u32.to_le_bytes());
        h[38..42].copy_from_slice(&2835u32.to_le_bytes());
        h[42..46].copy_from_slice(&2835u32.to_le_bytes());
        h
    }

    #[test]
    fn decodes_field_offsets() {
        let (file, info) = decode_headers(&sample_headers()).unwrap();
        assert_eq!(file.magic, *b"BM");
        assert_eq!(file.total_size, 66);
        assert_eq!(file.reserved, [1, 2, 3, 4]);
        assert_eq!(file.bitmap_offset, 54);
        assert_eq!(info.size, 40);
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color_planes, 1);
        assert_eq!(info.color_depth, 24);
        assert_eq!(info.compression, BI_RGB);
        assert_eq!(info.bitmap_size, 12);
        assert_eq!((info.x_resolution, info.y_resolution), (2835, 2835));
        assert_eq!(info.colors, 0);
        assert_eq!(info.important_colors, 0);
    }

    #[test]
    fn encode_inverts_decode() {
        let bytes = sample_headers();
        let (file, info) = decode_headers(&bytes).unwrap();
        assert_eq!(encode(&file, &info), bytes);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample_headers();
        bytes[0..2].copy_from_slice(b"XX");
        match decode_file_header(&bytes) {
            Err(BitmapError::Format(FormatError::BadMagic)) => {}
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn short_headers_hit_eof() {
        let bytes = sample_headers();
        assert!(matches!(
            decode_file_header(&bytes[..13]),
            Err(BitmapError::UnexpectedEof)
        ));
        assert!(matches!(
            decode_info_header(&bytes[14..53]),
            Err(BitmapError::UnexpectedEof)
        ));
        assert!(matches!(
            decode_headers(&bytes[..14]),
            Err(BitmapError::UnexpectedEof)
        ));
    }

    #[test]
    fn validation_order_is_depth_compression_size() {
        let (_, mut info) = decode_headers(&sample_headers()).unwrap();
        info.color_depth = 8;
        info.compression = BI_RLE8;
        info.bitmap_size = 0;
        assert_eq!(validate(&info), Err(FormatError::UnsupportedColorDepth(8)));
        info.color_depth = 24;
        assert_eq!(
            validate(&info),
            Err(FormatError::UnsupportedCompression(BI_RLE8))
        );
        info.compression = BI_RGB;
        assert_eq!(
            validate(&info),
            Err(FormatError::SizeMismatch {
                declared: 0,
                expected: 12
            })
        );
        info.bitmap_size = 12;
        assert_eq!(validate(&info), Ok(()));
    }

    #[test]
    fn size_check_does_not_wrap() {
        let (_, mut info) = decode_headers(&sample_headers()).unwrap();
        // 3 * 0x8000_0000 * 2 wraps to 0 in 32-bit arithmetic
        info.width = 0x8000_0000;
        info.height = 2;
        info.bitmap_size = 0;
        assert!(matches!(
            validate(&info),
            Err(FormatError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn derived_headers_rewrite_only_size_fields() {
        let (mut file, mut info) = decode_headers(&sample_headers()).unwrap();
        file.total_size = 9999;
        file.bitmap_offset = 138;
        info.size = 124;
        info.color_planes = 3;
        info.colors = 7;
        info.important_colors = 7;

        let (out_file, out_info) = derive_output_headers(&file, &info).unwrap();
        assert_eq!(out_file.magic, *b"BM");
        assert_eq!(out_file.total_size, 66);
        assert_eq!(out_file.reserved, [1, 2, 3, 4]);
        assert_eq!(out_file.bitmap_offset, 54);
        assert_eq!(out_info.size, 40);
        assert_eq!((out_info.width, out_info.height), (2, 2));
        assert_eq!(out_info.color_planes, 1);
        assert_eq!(out_info.color_depth, 24);
        assert_eq!(out_info.compression, BI_RGB);
        assert_eq!(out_info.bitmap_size, 12);
        assert_eq!((out_info.x_resolution, out_info.y_resolution), (2835, 2835));
        assert_eq!(out_info.colors, FULL_COLOR_COUNT);
        assert_eq!(out_info.important_colors, 0);
    }

    #[test]
    fn derived_size_overflow_is_an_error() {
        let (file, mut info) = decode_headers(&sample_headers()).unwrap();
        // 3 * w * h fits in u32, adding the 54 header bytes does not
        info.width = 0x5555_5555;
        info.height = 1;
        assert!(matches!(
            derive_output_headers(&file, &info),
            Err(BitmapError::DimensionsTooLarge { .. })
        ));
    }
}
