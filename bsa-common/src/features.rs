//! Feature extraction from grayscale brain scans
//!
//! Every scan is reduced to five scalars, always in the same order:
//!
//! 1. `mean_pixel_intensity` - mean of the 8-bit intensities
//! 2. `std_pixel_intensity` - population standard deviation of the intensities
//! 3. `entropy` - base-2 Shannon entropy of the intensity histogram
//! 4. `edge_density` - mean Sobel magnitude on intensities rescaled to [0, 1]
//! 5. `center_brightness` - mean intensity of the central crop
//!
//! Both classification paths consume the vector positionally, and the trained
//! estimator also matches it by column name, so the order is fixed.

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column names of the feature vector, in vector order
pub const FEATURE_NAMES: [&str; 5] = [
    "mean_pixel_intensity",
    "std_pixel_intensity",
    "entropy",
    "edge_density",
    "center_brightness",
];

type Kernel3 = [[f64; 3]; 3];

// Sobel kernels normalized by 4, so each response lies in [-1, 1].
const SOBEL_KERNEL_X: Kernel3 = [[0.25, 0.0, -0.25], [0.5, 0.0, -0.5], [0.25, 0.0, -0.25]];
const SOBEL_KERNEL_Y: Kernel3 = [[0.25, 0.5, 0.25], [0.0, 0.0, 0.0], [-0.25, -0.5, -0.25]];

/// Hand-engineered features of one scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean grayscale intensity (0-255)
    pub mean_pixel_intensity: f64,
    /// Standard deviation of grayscale intensity
    pub std_pixel_intensity: f64,
    /// Shannon entropy of the intensity distribution, in bits
    pub entropy: f64,
    /// Mean Sobel gradient magnitude, in [0, 1]
    pub edge_density: f64,
    /// Mean intensity of the central crop (0-255)
    pub center_brightness: f64,
}

impl FeatureVector {
    /// Features in `FEATURE_NAMES` order
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.mean_pixel_intensity,
            self.std_pixel_intensity,
            self.entropy,
            self.edge_density,
            self.center_brightness,
        ]
    }

    /// Build from values in `FEATURE_NAMES` order
    pub fn from_array(values: [f64; 5]) -> Self {
        let [mean_pixel_intensity, std_pixel_intensity, entropy, edge_density, center_brightness] =
            values;
        Self {
            mean_pixel_intensity,
            std_pixel_intensity,
            entropy,
            edge_density,
            center_brightness,
        }
    }
}

/// Extract features from encoded image bytes (PNG, JPEG, ...)
///
/// # Errors
/// - `Error::Decode` if the bytes are not a supported raster image
/// - `Error::InvalidImage` if the image is too small for a central crop
pub fn extract(image_bytes: &[u8]) -> Result<FeatureVector> {
    let decoded = image::load_from_memory(image_bytes)?;
    extract_from_gray(&to_luma(decoded))
}

/// Extract features from an already decoded grayscale image
pub fn extract_from_gray(gray: &GrayImage) -> Result<FeatureVector> {
    let (width, height) = gray.dimensions();

    // Reject before doing any full-image work
    let center_brightness =
        center_brightness(gray).ok_or(Error::InvalidImage { width, height })?;

    let pixels = gray.as_raw();
    let (mean_pixel_intensity, std_pixel_intensity) = mean_and_std(pixels);
    let entropy = shannon_entropy(pixels);
    let edge_density = edge_density(gray);

    tracing::trace!(
        "Features {}x{}: mean={:.3}, std={:.3}, entropy={:.4}, edges={:.5}, center={:.3}",
        width,
        height,
        mean_pixel_intensity,
        std_pixel_intensity,
        entropy,
        edge_density,
        center_brightness
    );

    Ok(FeatureVector {
        mean_pixel_intensity,
        std_pixel_intensity,
        entropy,
        edge_density,
        center_brightness,
    })
}

/// Convert a decoded image to single-channel luminance
///
/// 8-bit grayscale is kept as-is and grayscale+alpha keeps its luma channel.
/// Everything else goes through RGB and the ITU-R 601-2 transform
/// `L = R * 299/1000 + G * 587/1000 + B * 114/1000` in 16-bit fixed point.
pub fn to_luma(decoded: DynamicImage) -> GrayImage {
    match decoded {
        DynamicImage::ImageLuma8(gray) => gray,
        DynamicImage::ImageLumaA8(gray_alpha) => {
            GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
                Luma([gray_alpha.get_pixel(x, y)[0]])
            })
        }
        other => {
            let rgb = other.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([luma_601(r, g, b)])
            })
        }
    }
}

#[inline]
fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
    (weighted >> 16) as u8
}

fn mean_and_std(pixels: &[u8]) -> (f64, f64) {
    if pixels.is_empty() {
        return (0.0, 0.0);
    }

    let n = pixels.len() as f64;
    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    let mean = sum as f64 / n;

    let squared_deviation: f64 = pixels
        .iter()
        .map(|&p| (f64::from(p) - mean).powi(2))
        .sum();

    (mean, (squared_deviation / n).sqrt())
}

fn shannon_entropy(pixels: &[u8]) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &p in pixels {
        histogram[p as usize] += 1;
    }

    let n = pixels.len() as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .fold(0.0, |acc, h| acc + h)
}

/// Mean Sobel magnitude `sqrt((gx^2 + gy^2) / 2)` with mirrored borders
fn edge_density(gray: &GrayImage) -> f64 {
    let w = gray.width() as usize;
    let h = gray.height() as usize;
    if w == 0 || h == 0 {
        return 0.0;
    }

    let data = gray.as_raw();
    let at = |x: usize, y: usize| f64::from(data[y * w + x]) / 255.0;

    let mut total = 0.0;
    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, &yy) in y_idx.iter().enumerate() {
                for (kx, &xx) in x_idx.iter().enumerate() {
                    let v = at(xx, yy);
                    sum_x += SOBEL_KERNEL_X[ky][kx] * v;
                    sum_y += SOBEL_KERNEL_Y[ky][kx] * v;
                }
            }

            total += ((sum_x * sum_x + sum_y * sum_y) / 2.0).sqrt();
        }
    }

    total / (w * h) as f64
}

/// Mean of the central crop, or `None` when the crop is empty
///
/// With `ch = H / 4` and `cw = W / 4` the crop spans rows
/// `H/2 - ch/2 .. H/2 + ch/2` and columns `W/2 - cw/2 .. W/2 + cw/2`.
fn center_brightness(gray: &GrayImage) -> Option<f64> {
    let (w, h) = gray.dimensions();
    let (ch, cw) = (h / 4, w / 4);
    let (top, bottom) = (h / 2 - ch / 2, h / 2 + ch / 2);
    let (left, right) = (w / 2 - cw / 2, w / 2 + cw / 2);

    if top >= bottom || left >= right {
        return None;
    }

    let mut sum = 0u64;
    for y in top..bottom {
        for x in left..right {
            sum += u64::from(gray.get_pixel(x, y)[0]);
        }
    }

    let count = u64::from(bottom - top) * u64::from(right - left);
    Some(sum as f64 / count as f64)
}
