//! Image utilities.

use std::ops::Index;

use image::RgbImage;
use rayon::prelude::*;

use crate::{color::Color, error::Error};

/// A row-major grid of pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    pixels: Vec<T>,
}

impl<T> Image<T> {
    /// Wraps `pixels` as a `width`x`height` image. Fails if either dimension is zero or the
    /// pixel count doesn't match.
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(Error::DimensionMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<T> {
        self.pixels
    }

    pub fn pixel_index(&self, (x, y): (usize, usize)) -> usize {
        x + y * self.width
    }

    /// Converts a linear pixel index back into `(x, y)` coordinates.
    pub fn coordinates(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }
}

impl<T> Image<T>
where
    T: Copy + Sync,
{
    /// Maps every pixel in parallel into a new image of the same size. Runs on the current
    /// rayon pool.
    pub fn par_map<U, F>(&self, f: F) -> Image<U>
    where
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        Image {
            width: self.width,
            height: self.height,
            pixels: self.pixels.par_iter().map(|&pixel| f(pixel)).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Image<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.pixels[self.pixel_index(index)]
    }
}

impl Image<Color> {
    /// Builds an image from the pixel grid of a decoded RGB image.
    pub fn from_rgb_image(image: &RgbImage) -> Result<Self, Error> {
        let pixels = image.pixels().map(|&pixel| Color::from(pixel)).collect();
        Self::new(image.width() as usize, image.height() as usize, pixels)
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            self[(x as usize, y as usize)].into()
        })
    }
}
