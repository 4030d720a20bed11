// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — the preprocessing steps applied to a photographed
// identity document before text recognition. Operates on in-memory
// images using the `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, info, instrument};
use veridoc_core::error::VeridocError;

/// Preprocessing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and
/// returns a new `ImageProcessor` wrapping the transformed image,
/// enabling method chaining.
///
/// ```ignore
/// let binarized = ImageProcessor::open("id-card.jpg")?
///     .grayscale()
///     .denoise(1.2)
///     .binarize_otsu();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// Fails with [`VeridocError::InvalidImage`] when the path does not
    /// resolve to a decodable image.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, VeridocError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            VeridocError::InvalidImage(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, VeridocError> {
        let img = image::load_from_memory(data)
            .map_err(|err| VeridocError::InvalidImage(format!("failed to decode image: {err}")))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Convert the image to single-channel intensity (luma).
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        debug!("Converting to grayscale");
        Self {
            image: self.image.grayscale(),
        }
    }

    /// Apply Gaussian denoising with the given sigma.
    ///
    /// Smooths sensor noise and JPEG artefacts that would otherwise
    /// survive binarization as speckle. Typical sigma for phone photos
    /// is 1.0-1.5.
    #[instrument(skip(self), fields(sigma))]
    pub fn denoise(self, sigma: f32) -> Self {
        debug!(sigma, "Applying Gaussian denoise");
        let gray = self.image.to_luma8();
        let blurred = gaussian_blur_f32(&gray, sigma);
        Self {
            image: DynamicImage::ImageLuma8(blurred),
        }
    }

    /// Adjust contrast by a factor. Values > 1.0 increase contrast;
    /// values < 1.0 decrease it. A value of 1.0 is a no-op.
    ///
    /// Washed-out document photos benefit from a boost before
    /// binarization, pushing print and card background further apart.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        debug!(factor, "Adjusting contrast");

        let gray = self.image.to_luma8();
        let adjusted = image::ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            let Luma([v]) = *gray.get_pixel(x, y);
            let val = factor * (v as f32 - 128.0) + 128.0;
            Luma([val.clamp(0.0, 255.0) as u8])
        });

        Self {
            image: DynamicImage::ImageLuma8(adjusted),
        }
    }

    /// Binarize using a global threshold computed by Otsu's method.
    ///
    /// The threshold adapts to the image content, so photos taken in
    /// varying lighting binarize sensibly without per-image tuning.
    /// Pixels at or below the threshold become black, others white.
    #[instrument(skip(self))]
    pub fn binarize_otsu(self) -> Self {
        let gray = self.image.to_luma8();
        let threshold = otsu_threshold(&gray);
        debug!(threshold, "Otsu threshold computed");

        let (width, height) = gray.dimensions();
        let mut output = GrayImage::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let val = gray.get_pixel(x, y).0[0];
                let binary = if val <= threshold { 0u8 } else { 255u8 };
                output.put_pixel(x, y, Luma([binary]));
            }
        }

        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Finds the threshold value that maximises the between-class variance
/// of the black and white pixel groups.
fn otsu_threshold(gray: &GrayImage) -> u8 {
    // Build histogram.
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let mut sum_total: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// A two-level image must binarize into exactly the same two groups.
    #[test]
    fn binarize_otsu_separates_bimodal_image() {
        let mut img = GrayImage::from_pixel(20, 20, Luma([220u8]));
        // Dark square in the top-left corner.
        for y in 0..8 {
            for x in 0..8 {
                img.put_pixel(x, y, Luma([30u8]));
            }
        }

        let result = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize_otsu()
            .into_dynamic()
            .to_luma8();

        assert_eq!(result.get_pixel(0, 0).0[0], 0, "dark region must be black");
        assert_eq!(
            result.get_pixel(19, 19).0[0],
            255,
            "light region must be white"
        );
    }

    #[test]
    fn binarize_otsu_output_is_strictly_two_valued() {
        let mut img = GrayImage::new(16, 16);
        for (i, pixel) in img.pixels_mut().enumerate() {
            *pixel = Luma([(i % 256) as u8]);
        }

        let result = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize_otsu()
            .into_dynamic()
            .to_luma8();

        for pixel in result.pixels() {
            let v = pixel.0[0];
            assert!(v == 0 || v == 255, "binarized pixel must be 0 or 255, got {v}");
        }
    }

    #[test]
    fn otsu_threshold_empty_image_defaults() {
        let img = GrayImage::new(0, 0);
        assert_eq!(otsu_threshold(&img), 128);
    }

    #[test]
    fn grayscale_produces_single_channel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10])));
        let gray = ImageProcessor::from_dynamic(img).grayscale().into_dynamic();
        assert_eq!(gray.color().channel_count(), 1);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let result = ImageProcessor::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(VeridocError::InvalidImage(_))));
    }

    #[test]
    fn open_missing_path_is_invalid_image() {
        let result = ImageProcessor::open("/nonexistent/id-card.png");
        assert!(matches!(result, Err(VeridocError::InvalidImage(_))));
    }

    #[test]
    fn adjust_contrast_spreads_values_around_midpoint() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100u8]));
        img.put_pixel(1, 0, Luma([160u8]));

        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .adjust_contrast(1.5)
            .into_dynamic()
            .to_luma8();

        // 1.5 * (100 - 128) + 128 = 86; 1.5 * (160 - 128) + 128 = 176.
        assert_eq!(out.get_pixel(0, 0).0[0], 86);
        assert_eq!(out.get_pixel(1, 0).0[0], 176);
    }

    #[test]
    fn adjust_contrast_unit_factor_is_identity() {
        let mut img = GrayImage::new(3, 1);
        for (i, v) in [0u8, 128, 255].iter().enumerate() {
            img.put_pixel(i as u32, 0, Luma([*v]));
        }

        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img.clone()))
            .adjust_contrast(1.0)
            .into_dynamic()
            .to_luma8();

        assert_eq!(out, img);
    }

    #[test]
    fn denoise_preserves_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 24, Luma([128u8])));
        let out = ImageProcessor::from_dynamic(img).denoise(1.2);
        assert_eq!(out.width(), 32);
        assert_eq!(out.height(), 24);
    }
}
