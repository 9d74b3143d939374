use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::{map_colors, map_colors2};
use crate::colorspace;
use crate::config::SkinBounds;
use crate::error::{SkinToneError, SkinToneResult};

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Binary skin mask, every sample is either [`MASK_ON`] or [`MASK_OFF`].
pub type Mask = GrayImage;

/// Classifies pixels as skin by thresholding their HSV representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkinDetector {
    bounds: SkinBounds,
}

impl SkinDetector {
    pub fn new(bounds: SkinBounds) -> Self {
        SkinDetector { bounds }
    }

    /// Returns the image with every non-skin pixel zeroed, and the mask it was cut with.
    pub fn detect(&self, img: &RgbImage) -> SkinToneResult<(RgbImage, Mask)> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(SkinToneError::InvalidImageFormat(format!("empty {width}x{height} raster")));
        }
        let mask = self.mask(img);
        let skin = map_colors2(img, &mask, |px: Rgb<u8>, Luma([m]): Luma<u8>| {
            Rgb(px.0.map(|c| c & m))
        });
        Ok((skin, mask))
    }

    pub fn mask(&self, img: &RgbImage) -> Mask {
        let hsv = colorspace::into_hsv(img);
        map_colors(&hsv, |px: Rgb<u8>| {
            Luma([if self.bounds.contains(px.0) { MASK_ON } else { MASK_OFF }])
        })
    }
}

/// Share of mask samples that are on, `0.0` for an empty mask.
pub fn coverage(mask: &Mask) -> f64 {
    let total = mask.as_raw().len();
    if total == 0 {
        return 0.;
    }
    let on = mask.as_raw().iter().filter(|&&m| m == MASK_ON).count();
    on as f64 / total as f64
}
