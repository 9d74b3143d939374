use std::path::PathBuf;
use clap::ValueEnum;
use derivative::Derivative;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use crate::colorspace::HUE_RANGE;
use crate::error::{SkinToneError, SkinToneResult};

/// Where the saturation/brightness offset ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Every pixel is adjusted, the skin mask is computed but not used for selection.
    #[default]
    Global,
    /// Only pixels inside the skin mask are adjusted, the rest keep their original color.
    Skin,
}

/// Inclusive `[h, s, v]` range classified as skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SkinBounds {
    #[derivative(Default(value = "[0, 20, 70]"))]
    pub lower: [u8; 3],
    #[derivative(Default(value = "[20, 255, 255]"))]
    pub upper: [u8; 3],
}

impl SkinBounds {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    pub fn validate(&self) -> SkinToneResult<()> {
        if let Some(c) = (0..3).find(|&c| self.lower[c] > self.upper[c]) {
            return Err(SkinToneError::InvalidConfig(format!(
                "lower bound {} exceeds upper bound {} on channel {c}",
                self.lower[c], self.upper[c]
            )));
        }
        if i32::from(self.lower[0]) >= HUE_RANGE || i32::from(self.upper[0]) >= HUE_RANGE {
            return Err(SkinToneError::InvalidConfig(format!("hue bounds must be below {HUE_RANGE}")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SkinToneConfig {
    pub bounds: SkinBounds,
    #[derivative(Default(value = "20"))]
    pub saturation_offset: u8,
    #[derivative(Default(value = "10"))]
    pub value_offset: u8,
    pub mask_mode: MaskMode,
}

impl SkinToneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> SkinToneResult<()> {
        self.bounds.validate()
    }
}

/// Everything a batch run needs, in place of interactive prompts.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tone: SkinToneConfig,
    /// Worker threads, 0 uses all cores.
    pub jobs: usize,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        BatchConfig { input_dir: input_dir.into(), output_dir: output_dir.into(), tone: SkinToneConfig::default(), jobs: 1 }
    }
}
