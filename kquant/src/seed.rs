//! k-means++ palette seeding.

use rayon::{prelude::*, ThreadPool};
use tracing::{debug, trace};

use crate::{
    color::Color,
    error::Error,
    image::Image,
    palette::{find_nearest, Palette},
    rng::RandomSource,
};

/// Number of distinct values in the 24-bit RGB space.
const COLOR_SPACE_SIZE: u32 = 0x0100_0000;

/// Picks `colors` distinct initial palette colors for `image` using k-means++.
///
/// The first color is drawn uniformly from the whole RGB space and doesn't have to occur in
/// the image. Every following color is drawn from the image's colors that aren't chosen yet,
/// with a probability proportional to the squared distance to the nearest chosen color.
///
/// Fails with [`Error::NotEnoughColors`] if the image runs out of unchosen colors before
/// the palette is full.
pub fn seed<R>(
    image: &Image<Color>,
    colors: usize,
    rng: &mut R,
    pool: &ThreadPool,
) -> Result<Palette, Error>
where
    R: RandomSource + ?Sized,
{
    if colors == 0 {
        return Err(Error::InvalidColorCount(colors));
    }

    let distinct = distinct_colors(image, pool);
    // The random first color is the only one that may come from outside the image.
    if distinct.len() + 1 < colors {
        return Err(Error::NotEnoughColors {
            requested: colors,
            distinct: distinct.len(),
        });
    }

    let mut chosen = Vec::with_capacity(colors);
    chosen.push(Color::from_packed(rng.below(COLOR_SPACE_SIZE)));
    debug!(first = %chosen[0], candidates = distinct.len(), "seeding palette");

    while chosen.len() < colors {
        let weights = weigh_candidates(&distinct, &chosen, pool);
        let color = pick_weighted(&weights, rng.unit()).ok_or(Error::NotEnoughColors {
            requested: colors,
            distinct: distinct.len(),
        })?;
        trace!(%color, candidates = weights.len(), "picked seed color");
        chosen.push(color);
    }

    Palette::new(chosen)
}

/// Every color occurring in `image`, once, in ascending order.
pub fn distinct_colors(image: &Image<Color>, pool: &ThreadPool) -> Vec<Color> {
    let mut colors = image.pixels().to_vec();
    pool.install(|| colors.par_sort_unstable());
    colors.dedup();
    colors
}

/// Pairs every candidate that isn't chosen yet with its squared distance to the nearest chosen
/// color. Candidate order is preserved.
fn weigh_candidates(
    candidates: &[Color],
    chosen: &[Color],
    pool: &ThreadPool,
) -> Vec<(Color, u32)> {
    pool.install(|| {
        candidates
            .par_iter()
            .filter(|color| !chosen.contains(color))
            .map(|&color| (color, find_nearest(color, chosen).distance_squared))
            .collect()
    })
}

/// Selects the first candidate whose cumulative probability reaches `draw`. If rounding keeps
/// the cumulative sum below `draw`, the last candidate is selected. Returns `None` only when
/// there are no candidates.
fn pick_weighted(weights: &[(Color, u32)], draw: f64) -> Option<Color> {
    let &(last, _) = weights.last()?;
    let total: u64 = weights.iter().map(|&(_, weight)| u64::from(weight)).sum();

    let mut cumulative = 0.0;
    for &(color, weight) in weights {
        cumulative += weight as f64 / total as f64;
        if cumulative >= draw {
            return Some(color);
        }
    }
    Some(last)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rayon::ThreadPoolBuilder;

    use super::*;

    /// Replays fixed values instead of random ones.
    struct Scripted {
        below: VecDeque<u32>,
        unit: VecDeque<f64>,
    }

    impl Scripted {
        fn new(below: &[u32], unit: &[f64]) -> Self {
            Self {
                below: below.iter().copied().collect(),
                unit: unit.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for Scripted {
        fn below(&mut self, bound: u32) -> u32 {
            self.below.pop_front().unwrap() % bound
        }

        fn unit(&mut self) -> f64 {
            self.unit.pop_front().unwrap()
        }
    }

    const BLACK: Color = Color::new(0, 0, 0);
    const RED: Color = Color::new(255, 0, 0);
    const WHITE: Color = Color::new(255, 255, 255);

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn image() -> Image<Color> {
        Image::new(2, 2, vec![BLACK, WHITE, RED, WHITE]).unwrap()
    }

    #[test]
    fn scripted_seeding_is_exact() {
        // Red is 255² away from black and white is 3 * 255², so red covers [0, 0.25].
        let mut rng = Scripted::new(&[BLACK.packed()], &[0.1]);
        let palette = seed(&image(), 2, &mut rng, &pool()).unwrap();
        assert_eq!(palette.colors(), &[BLACK, RED]);

        let mut rng = Scripted::new(&[BLACK.packed()], &[0.9]);
        let palette = seed(&image(), 2, &mut rng, &pool()).unwrap();
        assert_eq!(palette.colors(), &[BLACK, WHITE]);
    }

    #[test]
    fn chosen_colors_are_never_picked_again() {
        let mut rng = Scripted::new(&[BLACK.packed()], &[0.9, 0.0]);
        let palette = seed(&image(), 3, &mut rng, &pool()).unwrap();
        assert_eq!(palette.colors(), &[BLACK, RED, WHITE]);
    }

    #[test]
    fn first_color_may_be_outside_the_image() {
        let mut rng = Scripted::new(&[0x123456], &[]);
        let palette = seed(&image(), 1, &mut rng, &pool()).unwrap();
        assert_eq!(palette.colors(), &[Color::new(0x12, 0x34, 0x56)]);
    }

    #[test]
    fn seeded_palette_has_distinct_colors() {
        let pixels: Vec<_> = (0..64u32).map(|i| Color::from_packed(i * 0x030507)).collect();
        let image = Image::new(8, 8, pixels).unwrap();
        let mut rng = nanorand::WyRand::new_seed(42);
        for colors in 1..=20 {
            let palette = seed(&image, colors, &mut rng, &pool()).unwrap();
            assert_eq!(palette.len(), colors);
            let mut deduped = palette.colors().to_vec();
            deduped.dedup();
            assert_eq!(deduped.len(), colors);
        }
    }

    #[test]
    fn zero_colors_is_rejected() {
        let mut rng = Scripted::new(&[], &[]);
        assert!(matches!(
            seed(&image(), 0, &mut rng, &pool()),
            Err(Error::InvalidColorCount(0))
        ));
    }

    #[test]
    fn too_few_image_colors_fails_early() {
        let image = Image::new(2, 1, vec![RED, RED]).unwrap();
        let mut rng = Scripted::new(&[], &[]);
        assert!(matches!(
            seed(&image, 3, &mut rng, &pool()),
            Err(Error::NotEnoughColors {
                requested: 3,
                distinct: 1
            })
        ));
    }

    #[test]
    fn exhausted_candidates_are_reported() {
        // The random first color lands on the image's only color.
        let image = Image::new(2, 1, vec![RED, RED]).unwrap();
        let mut rng = Scripted::new(&[RED.packed()], &[0.5]);
        assert!(matches!(
            seed(&image, 2, &mut rng, &pool()),
            Err(Error::NotEnoughColors {
                requested: 2,
                distinct: 1
            })
        ));
    }

    #[test]
    fn rounding_loss_falls_back_to_last_candidate() {
        let weights = [(BLACK, 1), (RED, 1), (WHITE, 1)];
        assert_eq!(pick_weighted(&weights, 0.2), Some(BLACK));
        assert_eq!(pick_weighted(&weights, 0.5), Some(RED));
        assert_eq!(pick_weighted(&weights, 1.5), Some(WHITE));
        assert_eq!(pick_weighted(&[], 0.5), None);
    }

    #[test]
    fn distinct_colors_are_sorted() {
        assert_eq!(distinct_colors(&image(), &pool()), vec![BLACK, RED, WHITE]);
    }
}
