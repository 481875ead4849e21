//! The k-means driver: seeding, refinement and rendering.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info_span, trace};

use crate::{
    assign::assign, color::Color, error::Error, image::Image, palette::Palette,
    rng::RandomSource, seed::seed, update::update,
};

/// A quantized image together with the palette it was rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorReducedImage {
    pub image: Image<Color>,
    pub palette: Palette,
}

/// Builds the worker pool the quantizer runs on. `threads == 0` lets rayon pick the thread
/// count.
pub fn build_pool(threads: usize) -> Result<ThreadPool, Error> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("kquant-{index}"))
        .build()?)
}

/// Reduces `image` to `colors` colors.
///
/// The palette is seeded once and then refined exactly `iterations` times; there is no
/// convergence check. With zero iterations the seeded palette is used as is.
pub fn quantize<R>(
    image: &Image<Color>,
    colors: usize,
    iterations: usize,
    rng: &mut R,
    pool: &ThreadPool,
) -> Result<ColorReducedImage, Error>
where
    R: RandomSource + ?Sized,
{
    let _span = info_span!("quantize", colors, iterations).entered();
    if colors == 0 {
        return Err(Error::InvalidColorCount(colors));
    }

    let mut palette = seed(image, colors, rng, pool)?;
    for iteration in 0..iterations {
        let clusters = assign(image, &palette, pool);
        palette = update(&clusters, &palette, pool);
        trace!(iteration, clusters = clusters.len(), "palette refined");
    }
    debug!(?palette, "palette complete");

    Ok(ColorReducedImage {
        image: render(image, &palette, pool),
        palette,
    })
}

/// Creates a new image where every pixel of `image` is replaced by its nearest palette color.
pub fn render(image: &Image<Color>, palette: &Palette, pool: &ThreadPool) -> Image<Color> {
    pool.install(|| image.par_map(|color| palette.nearest(color).color))
}

/// Quantizes `image` once for every color count in `1..=max_colors`, in ascending order.
pub fn sweep<R>(
    image: &Image<Color>,
    max_colors: usize,
    iterations: usize,
    rng: &mut R,
    pool: &ThreadPool,
) -> Result<Vec<ColorReducedImage>, Error>
where
    R: RandomSource + ?Sized,
{
    if max_colors == 0 {
        return Err(Error::InvalidColorCount(max_colors));
    }
    (1..=max_colors)
        .map(|colors| quantize(image, colors, iterations, &mut *rng, pool))
        .collect()
}
