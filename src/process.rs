use std::path::Path;
use image::RgbImage;
use crate::adjust::ToneAdjuster;
use crate::config::SkinToneConfig;
use crate::detect::{self, SkinDetector};
use crate::error::SkinToneResult;
use crate::helpers;

pub struct Processed {
    pub image: RgbImage,
    /// Share of pixels classified as skin.
    pub coverage: f64,
}

/// Decode, detect and adjust a single file. Nothing is written.
pub fn process<P: AsRef<Path>>(path: P, config: &SkinToneConfig) -> SkinToneResult<Processed> {
    let img = helpers::load_image(path)?;
    process_image(&img, config)
}

pub fn process_image(img: &RgbImage, config: &SkinToneConfig) -> SkinToneResult<Processed> {
    let (_skin, mask) = SkinDetector::new(config.bounds).detect(img)?;
    let image = ToneAdjuster::new(config).adjust(img, &mask)?;
    Ok(Processed { image, coverage: detect::coverage(&mask) })
}
