// THEORY:
// A `Frame` is the only image layout the scanline tools accept: a rectangular grid of
// three 8-bit channels. Decoded 8-bit images are forced into that shape on load:
// grayscale is replicated across the three channels and alpha is dropped. Deeper
// samples (16-bit, float) are rejected at the door with `UnsupportedFormat`, so every
// later stage can index pixels without re-checking.
//
// Frames are immutable inputs. Drawing always happens on a clone (`as_image().clone()`
// in the renderer, or the annotated copy made by the pipeline), which lets the clean
// frame be sampled again on the next tick or saved untouched.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::ScanError;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use tracing::debug;

/// Layout name reported for every accepted frame.
pub const FRAME_LAYOUT: &str = "CV_8UC3";

/// A decoded three-channel, 8-bit frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn from_rgb_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Wraps a packed RGB buffer, rejecting buffers whose length does not match the
    /// dimensions.
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, ScanError> {
        let len = bytes.len();
        RgbImage::from_raw(width, height, bytes)
            .map(Self::from_rgb_image)
            .ok_or_else(|| ScanError::UnsupportedFormat {
                layout: format!("{} bytes for {}x{} RGB", len, width, height),
            })
    }

    /// Accepts any 8-bit decode, converting grayscale and alpha variants to RGB.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, ScanError> {
        match image {
            DynamicImage::ImageRgb8(rgb) => Ok(Self::from_rgb_image(rgb)),
            DynamicImage::ImageRgba8(_) | DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_) => {
                debug!(layout = ?image.color(), "converting to 8-bit RGB");
                Ok(Self::from_rgb_image(image.to_rgb8()))
            }
            other => Err(ScanError::UnsupportedFormat {
                layout: format!("{:?}", other.color()),
            }),
        }
    }

    /// Decodes the still image at `path`. A missing or undecodable file is reported
    /// as `NotFound`.
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        let image = image::open(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "image decode failed");
            ScanError::NotFound {
                resource: "Image",
                path: path.display().to_string(),
            }
        })?;
        Self::from_dynamic(image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixel at column `x`, row `y`, in BGR order.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        Pixel::from_rgb(*self.image.get_pixel(x, y))
    }

    /// Every pixel of row `y`, left to right.
    pub fn row(&self, y: u32) -> impl Iterator<Item = Pixel> + '_ {
        (0..self.width()).map(move |x| self.pixel(x, y))
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Writes the frame to `path`, overwriting whatever is there. The encoder is
    /// picked from the file extension.
    pub fn save(&self, path: &Path) -> Result<(), ScanError> {
        self.image.save(path).map_err(|source| ScanError::Snapshot {
            path: path.display().to_string(),
            source,
        })
    }
}
