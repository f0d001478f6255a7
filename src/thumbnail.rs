use anyhow::{Context, Result};
use fast_image_resize::{images::Image, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Lightbox images are decoded up to this bound and never cached on disk.
pub const FULL_WIDTH: u32 = 1920;
pub const FULL_HEIGHT: u32 = 1440;

const UNSHARP_SIGMA: f32 = 0.5;
const UNSHARP_THRESHOLD: i32 = 1;

/// Downscaled image loader with an on-disk JPEG cache for thumbnails.
pub struct ImageLoader {
    cache_dir: PathBuf,
    thumb_width: u32,
    thumb_height: u32,
    quality: u8,
}

impl ImageLoader {
    pub fn new(cache_dir: PathBuf, thumb_width: u32, thumb_height: u32, quality: u8) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!(dir = %cache_dir.display(), error = %e, "thumbnail cache unavailable");
        }

        Self {
            cache_dir,
            thumb_width: thumb_width.max(1),
            thumb_height: thumb_height.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Generate a hash-based filename for the thumbnail
    fn thumb_filename(&self, source_path: &Path) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        source_path.to_string_lossy().hash(&mut hasher);
        (self.thumb_width, self.thumb_height).hash(&mut hasher);

        // Include modification time in hash if available
        if let Ok(metadata) = fs::metadata(source_path) {
            if let Ok(modified) = metadata.modified() {
                modified.hash(&mut hasher);
            }
        }

        let hash = hasher.finish();
        self.cache_dir.join(format!("{:016x}.jpg", hash))
    }

    /// Load a grid thumbnail, from disk cache when possible.
    pub fn load_thumbnail(&self, source_path: &Path) -> Result<DynamicImage> {
        let thumb_path = self.thumb_filename(source_path);
        if thumb_path.exists() {
            match image::open(&thumb_path) {
                Ok(img) => return Ok(img),
                Err(err) => {
                    tracing::warn!(
                        path = %thumb_path.display(),
                        error = %err,
                        "corrupt cached thumbnail, regenerating"
                    );
                    let _ = fs::remove_file(&thumb_path);
                }
            }
        }

        let result_image = downscale(source_path, self.thumb_width, self.thumb_height)?;
        if let Err(err) = save_as_jpeg(&result_image, &thumb_path, self.quality) {
            // Rendering still works without a cache entry.
            tracing::warn!(
                path = %thumb_path.display(),
                error = %err,
                "failed to persist thumbnail"
            );
        }

        Ok(DynamicImage::ImageRgba8(result_image))
    }

    /// Load the lightbox rendition of an image.
    pub fn load_full(&self, source_path: &Path) -> Result<DynamicImage> {
        let image = downscale(source_path, FULL_WIDTH, FULL_HEIGHT)?;
        Ok(DynamicImage::ImageRgba8(image))
    }
}

/// Calculate dimensions that fit within bounds while maintaining aspect ratio
fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (max_w.max(1), max_h.max(1));
    }
    let ratio_w = max_w as f32 / src_w as f32;
    let ratio_h = max_h as f32 / src_h as f32;
    // Never upscale.
    let ratio = ratio_w.min(ratio_h).min(1.0);

    let dst_w = (src_w as f32 * ratio).round() as u32;
    let dst_h = (src_h as f32 * ratio).round() as u32;

    (dst_w.max(1), dst_h.max(1))
}

fn downscale(source_path: &Path, max_w: u32, max_h: u32) -> Result<RgbaImage> {
    let src_image = image::open(source_path)
        .with_context(|| format!("Failed to open image: {}", source_path.display()))?;

    let src_rgba = src_image.to_rgba8();
    let (src_width, src_height) = (src_rgba.width(), src_rgba.height());
    let (dst_width, dst_height) = fit_dimensions(src_width, src_height, max_w, max_h);

    if (dst_width, dst_height) == (src_width, src_height) {
        return Ok(src_rgba);
    }

    let src_fir = Image::from_vec_u8(
        src_width,
        src_height,
        src_rgba.into_raw(),
        fast_image_resize::PixelType::U8x4,
    )?;

    let mut dst_fir = Image::new(dst_width, dst_height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    resizer.resize(
        &src_fir,
        &mut dst_fir,
        &ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Lanczos3,
        )),
    )?;

    let result_image = RgbaImage::from_raw(dst_width, dst_height, dst_fir.into_vec())
        .context("Failed to create output image")?;

    Ok(image::imageops::unsharpen(
        &result_image,
        UNSHARP_SIGMA,
        UNSHARP_THRESHOLD,
    ))
}

/// Save RGBA image as JPEG with specified quality
fn save_as_jpeg(img: &RgbaImage, path: &Path, quality: u8) -> Result<()> {
    let rgb_img = DynamicImage::ImageRgba8(img.clone()).to_rgb8();

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    encoder
        .encode_image(&rgb_img)
        .with_context(|| format!("Failed to encode JPEG: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn fit_dimensions_preserves_aspect_ratio() {
        assert_eq!(fit_dimensions(3840, 2160, 800, 600), (800, 450));
        assert_eq!(fit_dimensions(1080, 1920, 800, 600), (338, 600));
    }

    #[test]
    fn fit_dimensions_never_upscales() {
        assert_eq!(fit_dimensions(64, 32, 800, 600), (64, 32));
    }

    #[test]
    fn load_thumbnail_regenerates_corrupted_cache_entry() -> Result<()> {
        let root = tempfile::tempdir()?;
        let source_path = root.path().join("image.png");
        RgbImage::from_pixel(200, 100, Rgb([240, 80, 80])).save(&source_path)?;

        let loader = ImageLoader::new(root.path().join("cache"), 100, 100, 90);
        let thumb_path = loader.thumb_filename(&source_path);
        fs::write(&thumb_path, b"not-a-valid-jpeg")?;

        let loaded = loader.load_thumbnail(&source_path)?;
        assert_eq!((loaded.width(), loaded.height()), (100, 50));
        assert!(image::open(&thumb_path).is_ok());
        Ok(())
    }

    #[test]
    fn load_full_does_not_touch_the_cache() -> Result<()> {
        let root = tempfile::tempdir()?;
        let source_path = root.path().join("photo.png");
        RgbImage::from_pixel(40, 30, Rgb([10, 20, 30])).save(&source_path)?;

        let cache_dir = root.path().join("cache");
        let loader = ImageLoader::new(cache_dir.clone(), 16, 16, 90);
        let full = loader.load_full(&source_path)?;

        assert_eq!((full.width(), full.height()), (40, 30));
        assert_eq!(fs::read_dir(&cache_dir)?.count(), 0);
        Ok(())
    }

    #[test]
    fn missing_source_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(root.path().join("cache"), 16, 16, 90);
        let missing = root.path().join("nope.png");
        assert!(loader.load_thumbnail(&missing).is_err());
    }
}
