//! File-backed image source and crop primitive.
//!
//! [`FsImageSource`] serves local paths and `file://` URIs. Sizes and crops
//! are expressed in display orientation: the EXIF orientation tag is applied
//! before measuring or cutting.
//!
//! Cropped images are written next to each other in an output directory as
//! `<stem>-cropped-<n>.<ext>`, keeping the source format (PNG stays PNG,
//! everything else is written as JPEG).

mod crop;
mod orientation;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::SourceError;
use crate::geometry::{CropRectangle, Size};
use crate::services::{CropPrimitive, ImageSizeSource};

pub use crop::{crop_normalized, pixel_region};
pub use orientation::Orientation;

const FILE_SCHEME: &str = "file://";
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Local filesystem implementation of the image collaborators.
#[derive(Debug)]
pub struct FsImageSource {
    output_dir: PathBuf,
    written: AtomicU64,
}

impl FsImageSource {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: AtomicU64::new(0),
        }
    }

    /// Map a URI to a local path.
    pub fn resolve(uri: &str) -> Result<PathBuf, SourceError> {
        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            return Ok(PathBuf::from(path));
        }
        if uri.contains("://") {
            return Err(SourceError::Unsupported(uri.to_string()));
        }
        Ok(PathBuf::from(uri))
    }

    /// Natural size in display orientation.
    pub fn read_size(&self, path: &Path) -> Result<Size, SourceError> {
        let bytes = read(path)?;
        let (width, height) = reader(&bytes)?
            .into_dimensions()
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let stored = Size::new(f64::from(width), f64::from(height));
        Ok(Orientation::read(&bytes).oriented(stored))
    }

    /// Crop `rect` (display-orientation pixels) out of `path` and write it.
    pub fn crop_file(&self, path: &Path, rect: &CropRectangle) -> Result<PathBuf, SourceError> {
        let bytes = read(path)?;
        let orientation = Orientation::read(&bytes);
        let decoded = reader(&bytes)?
            .decode()
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let img = orientation.apply(decoded);

        let size = Size::new(f64::from(img.width()), f64::from(img.height()));
        let region = rect.normalized(size);
        let cropped = crop_normalized(&img, &region);

        let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Jpeg);
        let (format, extension) = match format {
            ImageFormat::Png => (ImageFormat::Png, "png"),
            _ => (ImageFormat::Jpeg, "jpg"),
        };
        let encoded = self.encode(&cropped, format)?;

        let target = self.output_path(path, extension);
        std::fs::write(&target, encoded).map_err(|e| SourceError::Io(e.to_string()))?;
        log::debug!(
            "wrote {}x{} crop of {} to {}",
            cropped.width(),
            cropped.height(),
            path.display(),
            target.display()
        );
        Ok(target)
    }

    fn encode(&self, img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, SourceError> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            ImageFormat::Png => img
                .write_to(&mut buffer, ImageFormat::Png)
                .map_err(|e| SourceError::Decode(e.to_string()))?,
            _ => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, DEFAULT_JPEG_QUALITY);
                img.to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| SourceError::Decode(e.to_string()))?
            }
        }
        Ok(buffer.into_inner())
    }

    fn output_path(&self, source: &Path, extension: &str) -> PathBuf {
        let n = self.written.fetch_add(1, Ordering::Relaxed) + 1;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        self.output_dir.join(format!("{stem}-cropped-{n}.{extension}"))
    }
}

fn read(path: &Path) -> Result<Vec<u8>, SourceError> {
    std::fs::read(path).map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, SourceError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| SourceError::Decode(e.to_string()))
}

impl ImageSizeSource for FsImageSource {
    async fn natural_size(&self, uri: &str) -> Result<Size, SourceError> {
        let path = Self::resolve(uri)?;
        self.read_size(&path)
    }
}

impl CropPrimitive for FsImageSource {
    async fn crop(&self, uri: &str, rect: CropRectangle) -> Result<String, String> {
        let path = Self::resolve(uri).map_err(|e| e.to_string())?;
        self.crop_file(&path, &rect)
            .map(|target| format!("{FILE_SCHEME}{}", target.display()))
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cropper-core-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("photo.png");
        let img = image::RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 256) as u8, 0, 0]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            FsImageSource::resolve("file:///tmp/a.jpg").unwrap(),
            PathBuf::from("/tmp/a.jpg")
        );
        assert_eq!(FsImageSource::resolve("a.jpg").unwrap(), PathBuf::from("a.jpg"));
        assert!(matches!(
            FsImageSource::resolve("https://example.com/a.jpg"),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_natural_size() {
        let dir = scratch("size");
        let path = write_png(&dir, 40, 20);
        let source = FsImageSource::new(&dir);

        let uri = format!("file://{}", path.display());
        let size = pollster::block_on(source.natural_size(&uri)).unwrap();
        assert_eq!(size, Size::new(40.0, 20.0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = FsImageSource::new(std::env::temp_dir());
        let result = pollster::block_on(source.natural_size("/definitely/not/here.png"));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn test_crop_writes_numbered_file() {
        let dir = scratch("crop");
        let path = write_png(&dir, 40, 20);
        let source = FsImageSource::new(&dir);
        let uri = format!("file://{}", path.display());

        let first = pollster::block_on(source.crop(&uri, CropRectangle::new(10.0, 0.0, 20.0, 10.0))).unwrap();
        assert!(first.ends_with("photo-cropped-1.png"), "{first}");

        let written = image::open(dir.join("photo-cropped-1.png")).unwrap();
        assert_eq!((written.width(), written.height()), (20, 10));
        // First column comes from x = 10
        assert_eq!(written.to_rgb8().get_pixel(0, 0).0[0], 10);

        let second = pollster::block_on(source.crop(&uri, CropRectangle::new(0.0, 0.0, 40.0, 20.0))).unwrap();
        assert!(second.ends_with("photo-cropped-2.png"), "{second}");
    }

    #[test]
    fn test_crop_error_is_message() {
        let source = FsImageSource::new(std::env::temp_dir());
        let err = pollster::block_on(source.crop("ftp://host/a.png", CropRectangle::new(0.0, 0.0, 1.0, 1.0)))
            .unwrap_err();
        assert_eq!(err, "Unsupported image source: ftp://host/a.png");
    }
}
