//! Image comparison: exact channel check, MSE and structural similarity.
//!
//! Screenshots captured on different machines often differ by a few pixels
//! in size. When dimensions differ both images are resampled to
//! `canonical_width` x source height before the statistics are computed;
//! such pairs can score high but are never reported as identical.

use crate::result::{DiffqaError, DiffqaResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, ImageEncoder, Rgba, RgbaImage};
use image_compare::Algorithm;
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

/// Width both images are resampled to when their dimensions differ
pub const CANONICAL_WIDTH: u32 = 2160;

/// Configuration for image comparison
#[derive(Debug, Clone)]
pub struct ImageCompareConfig {
    /// Width used when dimensions differ
    pub canonical_width: u32,
    /// Produce a PNG highlighting differing pixels
    pub visual_diff: bool,
}

impl Default for ImageCompareConfig {
    fn default() -> Self {
        Self {
            canonical_width: CANONICAL_WIDTH,
            visual_diff: false,
        }
    }
}

impl ImageCompareConfig {
    /// Set the canonical width
    #[must_use]
    pub const fn with_canonical_width(mut self, width: u32) -> Self {
        self.canonical_width = width;
        self
    }

    /// Enable the visual diff image
    #[must_use]
    pub const fn with_visual_diff(mut self, enabled: bool) -> Self {
        self.visual_diff = enabled;
        self
    }
}

/// Result of comparing two images
#[derive(Debug, Clone, Serialize)]
pub struct ImageDiff {
    /// Structural similarity (0.0-1.0, 1.0 = identical)
    pub similarity: f64,
    /// Mean squared error between the grayscale images
    pub mse: f64,
    /// Same shape and every channel difference is zero
    pub identical: bool,
    /// Non-zero pixel count of the absolute R, G and B differences
    pub channel_differences: [usize; 3],
    /// Whether the images were resampled to a common size
    pub resized: bool,
    /// Source width and height
    pub source_dimensions: (u32, u32),
    /// Target width and height
    pub target_dimensions: (u32, u32),
    /// Visual diff (PNG encoded, differing pixels in red)
    #[serde(skip)]
    pub diff_image: Option<Vec<u8>>,
}

impl ImageDiff {
    /// Whether the images differ at all
    #[must_use]
    pub const fn is_different(&self) -> bool {
        !self.identical
    }

    /// Identical, or similarity at least `threshold`
    #[must_use]
    pub fn meets(&self, threshold: f64) -> bool {
        self.identical || self.similarity >= threshold
    }

    /// Total of the per-channel non-zero difference counts
    #[must_use]
    pub fn total_channel_differences(&self) -> usize {
        self.channel_differences.iter().sum()
    }
}

/// Decode an image file, rejecting zero-sized images
pub fn load_image(path: impl AsRef<Path>) -> DiffqaResult<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| DiffqaError::invalid_image(path, e.to_string()))?;
    ensure_non_empty(&img, path)?;
    Ok(img)
}

fn ensure_non_empty(img: &DynamicImage, origin: &Path) -> DiffqaResult<()> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DiffqaError::invalid_image(
            origin,
            format!("zero-sized image ({width}x{height})"),
        ));
    }
    Ok(())
}

/// Image comparator
#[derive(Debug, Clone, Default)]
pub struct ImageComparator {
    config: ImageCompareConfig,
}

impl ImageComparator {
    /// Create a new comparator with configuration
    #[must_use]
    pub const fn new(config: ImageCompareConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ImageCompareConfig {
        &self.config
    }

    /// Compare two image files
    pub fn compare_files(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> DiffqaResult<ImageDiff> {
        let source_img = load_image(source)?;
        let target_img = load_image(target)?;
        self.compare_images(&source_img, &target_img)
    }

    /// Compare two encoded images (any format the `image` crate decodes)
    pub fn compare_bytes(&self, source: &[u8], target: &[u8]) -> DiffqaResult<ImageDiff> {
        let source_img = image::load_from_memory(source)
            .map_err(|e| DiffqaError::invalid_image("<source>", e.to_string()))?;
        let target_img = image::load_from_memory(target)
            .map_err(|e| DiffqaError::invalid_image("<target>", e.to_string()))?;
        self.compare_images(&source_img, &target_img)
    }

    /// Compare two decoded images
    pub fn compare_images(
        &self,
        source: &DynamicImage,
        target: &DynamicImage,
    ) -> DiffqaResult<ImageDiff> {
        ensure_non_empty(source, Path::new("<source>"))?;
        ensure_non_empty(target, Path::new("<target>"))?;

        let source_dimensions = source.dimensions();
        let target_dimensions = target.dimensions();
        let same_shape = source_dimensions == target_dimensions;

        let channel_differences = if same_shape {
            channel_nonzero_counts(&source.to_rgb8(), &target.to_rgb8())
        } else {
            [0; 3]
        };
        let identical = same_shape && channel_differences == [0; 3];

        let (source_img, target_img) = if same_shape {
            (Cow::Borrowed(source), Cow::Borrowed(target))
        } else {
            self.canonicalize(source, target)?
        };

        let source_gray = source_img.to_luma8();
        let target_gray = target_img.to_luma8();
        let mse = mean_squared_error(&source_gray, &target_gray);
        let similarity = if identical || source_gray.as_raw() == target_gray.as_raw() {
            1.0
        } else {
            structural_similarity(&source_gray, &target_gray)?
        };

        let diff_image = if self.config.visual_diff && !identical {
            Some(encode_visual_diff(
                &source_img.to_rgba8(),
                &target_img.to_rgba8(),
            )?)
        } else {
            None
        };

        tracing::debug!(
            similarity,
            mse,
            identical,
            resized = !same_shape,
            "image comparison complete"
        );

        Ok(ImageDiff {
            similarity,
            mse,
            identical,
            channel_differences,
            resized: !same_shape,
            source_dimensions,
            target_dimensions,
            diff_image,
        })
    }

    /// Resample both images to `canonical_width` x source height
    fn canonicalize<'a>(
        &self,
        source: &'a DynamicImage,
        target: &'a DynamicImage,
    ) -> DiffqaResult<(Cow<'a, DynamicImage>, Cow<'a, DynamicImage>)> {
        let width = self.config.canonical_width;
        if width == 0 {
            return Err(DiffqaError::config("canonical_width must be non-zero"));
        }
        let height = source.height();
        tracing::debug!(width, height, "resampling images to a common size");

        let source_img = if source.width() == width {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(source.resize_exact(width, height, FilterType::Triangle))
        };
        let target_img = Cow::Owned(target.resize_exact(width, height, FilterType::Triangle));
        Ok((source_img, target_img))
    }
}

/// Count pixels with a non-zero absolute difference, per RGB channel
fn channel_nonzero_counts(source: &image::RgbImage, target: &image::RgbImage) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for (a, b) in source.pixels().zip(target.pixels()) {
        for (channel, count) in counts.iter_mut().enumerate() {
            if a[channel] != b[channel] {
                *count += 1;
            }
        }
    }
    counts
}

/// Sum of squared pixel differences divided by the pixel count
#[must_use]
pub fn mean_squared_error(source: &GrayImage, target: &GrayImage) -> f64 {
    let pixels = f64::from(source.width()) * f64::from(source.height());
    if pixels == 0.0 {
        return 0.0;
    }
    let sum: f64 = source
        .as_raw()
        .iter()
        .zip(target.as_raw())
        .map(|(&a, &b)| {
            let d = f64::from(a) - f64::from(b);
            d * d
        })
        .sum();
    sum / pixels
}

/// Windowed SSIM between two equally sized grayscale images, clamped to [0, 1]
pub fn structural_similarity(source: &GrayImage, target: &GrayImage) -> DiffqaResult<f64> {
    let result = image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, source, target)
        .map_err(|e| DiffqaError::ImageComparison {
            message: format!("SSIM calculation failed: {e:?}"),
        })?;
    Ok(result.score.clamp(0.0, 1.0))
}

/// Encode a PNG where differing pixels are red and matching ones are dimmed
fn encode_visual_diff(source: &RgbaImage, target: &RgbaImage) -> DiffqaResult<Vec<u8>> {
    let (width, height) = source.dimensions();
    let mut diff_img = RgbaImage::new(width, height);

    for (x, y, pixel) in source.enumerate_pixels() {
        let other = target.get_pixel(x, y);
        if pixel_diff(*pixel, *other) > 0 {
            diff_img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        } else {
            let Rgba([r, g, b, _]) = *pixel;
            diff_img.put_pixel(x, y, Rgba([r / 2, g / 2, b / 2, 128]));
        }
    }

    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            diff_img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| DiffqaError::ImageComparison {
            message: format!("Failed to encode diff image: {e}"),
        })?;
    Ok(buffer)
}

/// Sum of absolute RGB channel differences
fn pixel_diff(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    let Rgba([r1, g1, b1, _]) = a;
    let Rgba([r2, g2, b2, _]) = b;

    let dr = i32::from(r1) - i32::from(r2);
    let dg = i32::from(g1) - i32::from(g2);
    let db = i32::from(b1) - i32::from(b2);

    dr.unsigned_abs() + dg.unsigned_abs() + db.unsigned_abs()
}
