//! Dominant color classification for garment photos.
//!
//! Brightness and hue-range heuristics over a fixed-size canvas: a dark
//! image is black, a mostly blown-out image is white, otherwise the first
//! hue band covering enough saturated pixels names the color.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader, RgbImage};
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

// --- Named constants ---
const CANVAS_SIZE: u32 = 200;
const MEDIAN_KERNEL: usize = 5;
const BLACK_MEAN_THRESHOLD: f32 = 50.0;
const WHITE_PIXEL_THRESHOLD: u8 = 240;
const WHITE_RATIO_THRESHOLD: f32 = 0.85;
const HUE_RATIO_THRESHOLD: f32 = 0.1;
const MIN_SATURATION: u8 = 50;
const MIN_VALUE: u8 = 50;

/// Hue bands on the 0..180 scale, checked in this order. Lower bound
/// inclusive, upper bound exclusive.
const HUE_BANDS: [(ColorLabel, u8, u8); 6] = [
    (ColorLabel::Yellow, 25, 35),
    (ColorLabel::Orange, 11, 25),
    (ColorLabel::Red, 0, 15),
    (ColorLabel::Green, 40, 85),
    (ColorLabel::Blue, 100, 140),
    (ColorLabel::Purple, 140, 160),
];

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: ImageError,
    },
}

/// Color label assigned to a garment image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorLabel {
    Black,
    White,
    Yellow,
    Orange,
    Red,
    Green,
    Blue,
    Purple,
    /// The image could not be decoded.
    Unknown,
    /// Decoded fine, but no rule matched. Rendered as `"None"`.
    NoMatch,
}

impl ColorLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Unknown => "unknown",
            Self::NoMatch => "None",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode an image file. The format is sniffed from the content, so a
/// missing or wrong extension does not matter.
pub fn load_image(path: &Path) -> Result<DynamicImage, ClassifierError> {
    let decode = || -> Result<DynamicImage, ImageError> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    decode().map_err(|source| ClassifierError::Decode {
        path: path.display().to_string(),
        source,
    })
}

/// Classify the image at `path`. Decode failures yield [`ColorLabel::Unknown`].
pub fn classify_path(path: &Path) -> ColorLabel {
    match load_image(path) {
        Ok(img) => {
            let label = classify_image(&img);
            tracing::debug!(path = %path.display(), color = %label, "classified image");
            label
        }
        Err(e) => {
            tracing::warn!(error = %e, "image decode failed; color unknown");
            ColorLabel::Unknown
        }
    }
}

pub fn classify_image(img: &DynamicImage) -> ColorLabel {
    classify_rgb(&img.to_rgb8())
}

/// Classify an RGB image. Pure: identical pixels always give the same label.
pub fn classify_rgb(rgb: &RgbImage) -> ColorLabel {
    if rgb.width() == 0 || rgb.height() == 0 {
        return ColorLabel::NoMatch;
    }

    let canvas = imageops::resize(rgb, CANVAS_SIZE, CANVAS_SIZE, FilterType::Triangle);
    let (w, h) = (canvas.width() as usize, canvas.height() as usize);

    let gray = to_grayscale(&canvas);
    let blurred = median_blur(&gray, w, h, MEDIAN_KERNEL);

    if mean_brightness(&blurred) < BLACK_MEAN_THRESHOLD {
        return ColorLabel::Black;
    }

    let white = blurred.iter().filter(|&&p| p >= WHITE_PIXEL_THRESHOLD).count();
    if ratio(white, blurred.len()) > WHITE_RATIO_THRESHOLD {
        return ColorLabel::White;
    }

    let hsv: Vec<(u8, u8, u8)> = canvas
        .pixels()
        .map(|p| rgb_to_hsv(p[0], p[1], p[2]))
        .collect();

    for (label, lo, hi) in HUE_BANDS {
        let in_band = hsv
            .iter()
            .filter(|&&(hue, sat, val)| {
                hue >= lo && hue < hi && sat >= MIN_SATURATION && val >= MIN_VALUE
            })
            .count();
        if ratio(in_band, hsv.len()) > HUE_RATIO_THRESHOLD {
            return label;
        }
    }

    ColorLabel::NoMatch
}

fn ratio(count: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    count as f32 / total as f32
}

/// Luma with ITU-R BT.601 weights, rounded to the nearest integer.
fn to_grayscale(rgb: &RgbImage) -> Vec<u8> {
    rgb.pixels()
        .map(|p| {
            let (r, g, b) = (p[0] as u32, p[1] as u32, p[2] as u32);
            ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
        })
        .collect()
}

fn mean_brightness(gray: &[u8]) -> f32 {
    if gray.is_empty() {
        return 0.0;
    }
    gray.iter().map(|&b| b as f32).sum::<f32>() / gray.len() as f32
}

/// Square median filter with replicated borders.
fn median_blur(gray: &[u8], width: usize, height: usize, kernel: usize) -> Vec<u8> {
    if width == 0 || height == 0 || gray.len() < width * height {
        return gray.to_vec();
    }
    let radius = (kernel / 2) as isize;
    let mut window = Vec::with_capacity(kernel * kernel);
    let mut out = vec![0u8; width * height];

    for y in 0..height {
        for x in 0..width {
            window.clear();
            for dy in -radius..=radius {
                let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                for dx in -radius..=radius {
                    let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                    window.push(gray[sy * width + sx]);
                }
            }
            let mid = window.len() / 2;
            let (_, median, _) = window.select_nth_unstable(mid);
            out[y * width + x] = *median;
        }
    }
    out
}

/// 8-bit HSV: hue on 0..180 (degrees halved), saturation and value on 0..255.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());
    let hue = hsv.hue.into_positive_degrees() / 2.0;
    (
        hue.round().min(179.0) as u8,
        (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8,
        (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
