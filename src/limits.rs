use crate::bmp::InfoHeader;
use crate::error::BitmapError;

/// Caps on the image dimensions a conversion will accept.
///
/// Checked against the decoded info header, before any output is written.
/// Unset fields accept any value.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Cap on `width * height`.
    pub max_pixels: Option<u64>,
}

impl Limits {
    /// Reject `info` if a dimension field is above its cap.
    pub(crate) fn check(&self, info: &InfoHeader) -> Result<(), BitmapError> {
        let over = |field: &str, value: u64, max: u64| {
            BitmapError::LimitExceeded(format!(
                "info header {field} is {value}, above the maximum of {max}"
            ))
        };
        if let Some(max) = self.max_width
            && u64::from(info.width) > max
        {
            return Err(over("width", info.width.into(), max));
        }
        if let Some(max) = self.max_height
            && u64::from(info.height) > max
        {
            return Err(over("height", info.height.into(), max));
        }
        if let Some(max) = self.max_pixels
            && info.pixel_count() > max
        {
            return Err(over("width * height", info.pixel_count(), max));
        }
        Ok(())
    }
}
