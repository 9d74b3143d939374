use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use image::{ImageReader, RgbImage};
use serde::Serialize;
use crate::config::SkinToneConfig;
use crate::error::{SkinToneError, SkinToneResult};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];
pub const OUTPUT_PREFIX: &str = "processed_";

pub fn load_image<P: AsRef<Path>>(path: P) -> SkinToneResult<RgbImage> {
    let path = path.as_ref();
    let decode_err = |source| SkinToneError::Decode { path: path.to_owned(), source };
    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
    Ok(reader.decode().map_err(decode_err)?.into_rgb8())
}

pub fn save_image<P: AsRef<Path>>(img: &RgbImage, path: P) -> SkinToneResult<()> {
    let path = path.as_ref();
    img.save(path).map_err(|source| SkinToneError::Encode { path: path.to_owned(), source })
}

pub fn load_config<P: AsRef<Path>>(path: P) -> SkinToneResult<SkinToneConfig> {
    let config: SkinToneConfig = serde_json::from_reader(File::open(path)?)?;
    config.validate()?;
    Ok(config)
}

pub fn save_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> SkinToneResult<()> {
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), value)?;
    Ok(())
}

/// Case-insensitive check against [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|supported| ext.eq_ignore_ascii_case(supported)))
        .unwrap_or(false)
}

/// `dir/processed_<file name>`, `None` if `input` has no file name. Non-UTF-8 names are kept as is.
pub fn output_path(input: &Path, dir: &Path) -> Option<PathBuf> {
    let mut name = OsString::from(OUTPUT_PREFIX);
    name.push(input.file_name()?);
    Some(dir.join(name))
}
