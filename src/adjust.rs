use image::{Luma, Rgb, RgbImage};
use imageproc::map::{map_colors, map_colors2};
use crate::colorspace::{self, hsv_to_rgb, rgb_to_hsv, Hsv};
use crate::config::{MaskMode, SkinToneConfig};
use crate::detect::{Mask, MASK_OFF};
use crate::error::{SkinToneError, SkinToneResult};

/// Raises saturation and brightness by fixed, saturating offsets.
#[derive(Debug, Clone, Copy)]
pub struct ToneAdjuster {
    saturation_offset: u8,
    value_offset: u8,
    mask_mode: MaskMode,
}

impl ToneAdjuster {
    pub fn new(config: &SkinToneConfig) -> Self {
        ToneAdjuster {
            saturation_offset: config.saturation_offset,
            value_offset: config.value_offset,
            mask_mode: config.mask_mode,
        }
    }

    fn offset(&self, hsv: Hsv) -> Hsv {
        let [h, s, v] = hsv.0;
        Rgb([h, s.saturating_add(self.saturation_offset), v.saturating_add(self.value_offset)])
    }

    pub fn adjust_pixel(&self, px: Rgb<u8>) -> Rgb<u8> {
        hsv_to_rgb(self.offset(rgb_to_hsv(px)))
    }

    /// `mask` has to come from the same frame as `img`.
    pub fn adjust(&self, img: &RgbImage, mask: &Mask) -> SkinToneResult<RgbImage> {
        if img.dimensions() != mask.dimensions() {
            return Err(SkinToneError::InvalidImageFormat(format!(
                "mask is {:?} but image is {:?}",
                mask.dimensions(),
                img.dimensions()
            )));
        }
        let adjusted = match self.mask_mode {
            MaskMode::Global => {
                let hsv = map_colors(&colorspace::into_hsv(img), |px| self.offset(px));
                colorspace::from_hsv(&hsv)
            }
            MaskMode::Skin => map_colors2(img, mask, |px: Rgb<u8>, Luma([m]): Luma<u8>| {
                if m == MASK_OFF { px } else { self.adjust_pixel(px) }
            }),
        };
        Ok(adjusted)
    }
}

impl Default for ToneAdjuster {
    fn default() -> Self {
        ToneAdjuster::new(&SkinToneConfig::default())
    }
}
