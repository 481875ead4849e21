//! Nearest-centroid assignment: groups every pixel of an image under the palette color it is
//! closest to.

use std::collections::HashMap;

use parking_lot::Mutex;
use rayon::{prelude::*, ThreadPool};

use crate::{color::Color, image::Image, palette::Palette};

/// Pixel colors grouped by their nearest palette color. Every pixel is present, so a color
/// that occurs many times in the image is repeated in its group.
pub type Clusters = HashMap<Color, Vec<Color>>;

/// A pixel color together with its closest palette color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Association {
    pub color: Color,
    pub palette_color: Color,
    pub distance: f64,
}

/// Finds the nearest palette color for every pixel of `image`, in pixel order.
pub fn nearest_colors(
    image: &Image<Color>,
    palette: &Palette,
    pool: &ThreadPool,
) -> Vec<Association> {
    pool.install(|| {
        image
            .pixels()
            .par_iter()
            .map(|&color| {
                let nearest = palette.nearest(color);
                Association {
                    color,
                    palette_color: nearest.color,
                    distance: nearest.distance(),
                }
            })
            .collect()
    })
}

/// Groups every pixel of `image` by its nearest palette color.
pub fn assign(image: &Image<Color>, palette: &Palette, pool: &ThreadPool) -> Clusters {
    let associations = nearest_colors(image, palette, pool);
    group(&associations, pool)
}

/// Groups associations by palette color.
///
/// The associations are split into one strided shard per worker thread. Each shard is
/// grouped into a local map first and then merged into the result while holding the lock
/// once.
pub fn group(associations: &[Association], pool: &ThreadPool) -> Clusters {
    let shards = pool.current_num_threads().max(1);
    let clusters = Mutex::new(Clusters::new());

    pool.install(|| {
        (0..shards).into_par_iter().for_each(|shard| {
            let mut local = Clusters::new();
            for association in associations.iter().skip(shard).step_by(shards) {
                local
                    .entry(association.palette_color)
                    .or_default()
                    .push(association.color);
            }

            let mut clusters = clusters.lock();
            for (palette_color, colors) in local {
                clusters.entry(palette_color).or_default().extend(colors);
            }
        });
    });

    clusters.into_inner()
}
