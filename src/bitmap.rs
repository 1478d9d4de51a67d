//! Obstacle bitmap
//!
//! The obstacle is authored as an image. It is scaled to the scene once at
//! startup; the pixels are kept for display and reduced to an
//! [`OccupancyMask`] for collision.

use std::path::Path;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::BitmapError;
use crate::sim::OccupancyMask;

/// RGBA obstacle image at scene resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleBitmap {
    width: u32,
    height: u32,
    /// Row-major RGBA pixels
    pixels: Vec<[u8; 4]>,
}

/// Whether a pixel counts as empty space.
/// Fully transparent pixels show the background when drawn, so they count too.
#[inline]
pub fn is_background(pixel: [u8; 4], background: [u8; 3]) -> bool {
    pixel[3] == 0 || pixel[..3] == background
}

impl ObstacleBitmap {
    /// Wrap raw row-major pixels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Paint a bitmap by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn from_image(img: &RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            pixels: img.pixels().map(|p| p.0).collect(),
        }
    }

    /// Decode an image file and stretch it to exactly `width` x `height`
    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, BitmapError> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let (src_w, src_h) = (img.width(), img.height());
        let img = img.resize_exact(width, height, FilterType::Nearest).to_rgba8();
        log::info!(
            "Loaded obstacle {} ({}x{} -> {}x{})",
            path.display(),
            src_w,
            src_h,
            width,
            height
        );
        Ok(Self::from_image(&img))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixel at (x, y); transparent black off the image
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Reduce to an occupancy mask: solid wherever the pixel is not background
    pub fn to_mask(&self, background: [u8; 3]) -> OccupancyMask {
        OccupancyMask::from_fn(self.width, self.height, |x, y| {
            !is_background(self.pixel(x, y), background)
        })
    }
}
