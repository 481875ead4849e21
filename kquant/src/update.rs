//! Palette refinement: moves every palette color to the mean of the pixels assigned to it.

use std::collections::HashMap;

use rayon::{prelude::*, ThreadPool};

use crate::{assign::Clusters, color::Color, palette::Palette};

/// Componentwise integer mean of `colors`, truncated. Returns `None` for an empty slice.
///
/// Channel sums are accumulated in `u64`, which stays exact for up to `u64::MAX / 255` pixels.
pub fn average(colors: &[Color]) -> Option<Color> {
    if colors.is_empty() {
        return None;
    }

    let (r, g, b) = colors.iter().fold((0u64, 0u64, 0u64), |(r, g, b), color| {
        (
            r + u64::from(color.r),
            g + u64::from(color.g),
            b + u64::from(color.b),
        )
    });
    let count = colors.len() as u64;
    Some(Color::new(
        (r / count) as u8,
        (g / count) as u8,
        (b / count) as u8,
    ))
}

/// Computes the next palette from the current clusters.
///
/// Each palette color becomes the average of its cluster. A color without any assigned
/// pixels is kept as it is, so the palette never shrinks.
pub fn update(clusters: &Clusters, palette: &Palette, pool: &ThreadPool) -> Palette {
    let averages: HashMap<Color, Color> = pool.install(|| {
        clusters
            .par_iter()
            .filter_map(|(&palette_color, colors)| Some((palette_color, average(colors)?)))
            .collect()
    });

    palette.map(|color| averages.get(&color).copied().unwrap_or(color))
}

#[cfg(test)]
mod tests {
    use rayon::ThreadPoolBuilder;

    use super::*;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn average_truncates() {
        let colors = [Color::new(0, 1, 255), Color::new(10, 2, 254)];
        assert_eq!(average(&colors), Some(Color::new(5, 1, 254)));
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn average_counts_every_pixel() {
        let colors = [
            Color::new(0, 0, 0),
            Color::new(0, 0, 0),
            Color::new(0, 0, 0),
            Color::new(90, 0, 0),
        ];
        assert_eq!(average(&colors), Some(Color::new(22, 0, 0)));
    }

    #[test]
    fn average_of_many_white_pixels_does_not_overflow() {
        let colors = vec![Color::new(255, 255, 255); 1 << 20];
        assert_eq!(average(&colors), Some(Color::new(255, 255, 255)));
    }

    #[test]
    fn updates_slot_to_cluster_mean() {
        let palette = Palette::new(vec![Color::new(3, 0, 0)]).unwrap();
        let clusters = Clusters::from([(
            Color::new(3, 0, 0),
            vec![Color::new(0, 0, 0), Color::new(10, 0, 0)],
        )]);
        let updated = update(&clusters, &palette, &pool());
        assert_eq!(updated.colors(), &[Color::new(5, 0, 0)]);
    }

    #[test]
    fn dead_centers_are_carried_over() {
        let dead = Color::new(200, 200, 200);
        let live = Color::new(10, 10, 10);
        let palette = Palette::new(vec![dead, live]).unwrap();
        let clusters = Clusters::from([(live, vec![Color::new(20, 20, 20)])]);

        let updated = update(&clusters, &palette, &pool());
        assert_eq!(updated.colors(), &[Color::new(20, 20, 20), dead]);
    }

    #[test]
    fn result_is_sorted() {
        let a = Color::new(0, 0, 10);
        let b = Color::new(0, 0, 20);
        let palette = Palette::new(vec![a, b]).unwrap();
        let clusters = Clusters::from([
            (a, vec![Color::new(255, 0, 0)]),
            (b, vec![Color::new(0, 0, 0)]),
        ]);
        let updated = update(&clusters, &palette, &pool());
        assert_eq!(
            updated.colors(),
            &[Color::new(0, 0, 0), Color::new(255, 0, 0)]
        );
    }
}
