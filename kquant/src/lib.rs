//! Color quantization with k-means clustering.
//!
//! An image is reduced to a palette of `k` colors: the palette is seeded with k-means++, refined
//! a fixed number of times by moving every color to the mean of the pixels nearest to it, and
//! finally every pixel is replaced by its nearest palette color.
//!
//! All parallel work runs on a caller-supplied [`rayon::ThreadPool`] (see [`build_pool`]), and
//! all randomness comes from a caller-supplied [`RandomSource`].

pub mod assign;
pub mod color;
pub mod error;
pub mod image;
pub mod palette;
pub mod quantize;
pub mod rng;
pub mod seed;
pub mod update;

pub use crate::{
    color::Color,
    error::Error,
    image::Image,
    palette::Palette,
    quantize::{build_pool, quantize, render, sweep, ColorReducedImage},
    rng::RandomSource,
};
pub use rayon::ThreadPool;
