//! 8-bit HSV conversion.
//!
//! Hue is stored as degrees / 2 (`0..=179`) so a full pixel fits into three bytes, saturation and value
//! span `0..=255`. An [`HsvImage`] reuses the `Rgb<u8>` pixel type with the channels holding `[h, s, v]`.

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::map::map_colors;

pub type Hsv = Rgb<u8>;
pub type HsvImage = ImageBuffer<Hsv, Vec<u8>>;

/// Number of hue steps in a full circle.
pub const HUE_RANGE: i32 = 180;

// (r, g, b) index into [v, p, q, t] for each of the six hue sectors
const SECTORS: [[usize; 3]; 6] = [[0, 3, 1], [2, 0, 1], [1, 0, 3], [1, 2, 0], [3, 1, 0], [0, 1, 2]];

/// `num / den` rounded half up, `den > 0`.
fn div_round(num: i32, den: i32) -> i32 {
    (2 * num + den).div_euclid(2 * den)
}

pub fn rgb_to_hsv(px: Rgb<u8>) -> Hsv {
    let [r, g, b] = px.0.map(i32::from);
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);
    let s = if v == 0 { 0 } else { div_round(255 * diff, v) };
    let h = if diff == 0 {
        0
    } else if v == r {
        div_round(30 * (g - b), diff)
    } else if v == g {
        div_round(60 * diff + 30 * (b - r), diff)
    } else {
        div_round(120 * diff + 30 * (r - g), diff)
    };
    let h = h.rem_euclid(HUE_RANGE);
    Rgb([h as u8, s as u8, v as u8])
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb<u8> {
    let [h, s, v] = hsv.0;
    let s = f32::from(s) / 255.;
    let v = f32::from(v) / 255.;
    let h = f32::from(h) / 30.;
    let sector = h.floor();
    let f = h - sector;
    let tab = [v, v * (1. - s), v * (1. - s * f), v * (1. - s * (1. - f))];
    let [r, g, b] = SECTORS[sector as usize % 6];
    let to_u8 = |x: f32| (x * 255.).round().clamp(0., 255.) as u8;
    Rgb([to_u8(tab[r]), to_u8(tab[g]), to_u8(tab[b])])
}

pub fn into_hsv(img: &RgbImage) -> HsvImage {
    map_colors(img, rgb_to_hsv)
}

pub fn from_hsv(img: &HsvImage) -> RgbImage {
    map_colors(img, hsv_to_rgb)
}
