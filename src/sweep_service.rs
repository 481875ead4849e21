//! Palette size sweep: quantizes one image for every palette size from 1 to N.

use std::{path::PathBuf, sync::Arc};

use image::RgbImage;
use kquant::{Color, ColorReducedImage, Image, Palette, ThreadPool};
use nanorand::{Rng, WyRand};
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{debug, info, trace};

use crate::{
    common::{output_paths, Error},
    config::{QuantizerConfig, SweepConfig},
};

/// Files written for a single palette size.
#[derive(Debug)]
pub struct SweepOutput {
    pub colors: usize,
    pub palette: Palette,
    pub image_path: PathBuf,
    pub palette_path: PathBuf,
}

pub struct SweepService {
    quantizer: QuantizerConfig,
    sweep: SweepConfig,
    seed: u64,
    stem: String,
    image: Arc<Image<Color>>,
    pool: Arc<ThreadPool>,
    jobs: Semaphore,
}

impl SweepService {
    pub fn new(
        quantizer: QuantizerConfig,
        sweep: SweepConfig,
        image: Image<Color>,
        pool: ThreadPool,
        stem: String,
    ) -> Arc<Self> {
        let seed = quantizer.seed.unwrap_or_else(|| {
            let mut rng = nanorand::tls_rng();
            rng.generate()
        });
        debug!(seed, "sweep seed chosen");

        Arc::new(SweepService {
            seed,
            stem,
            image: Arc::new(image),
            pool: Arc::new(pool),
            jobs: Semaphore::new(sweep.max_jobs.max(1)),
            quantizer,
            sweep,
        })
    }

    /// Runs every palette size and returns the outputs in ascending palette size. The first
    /// failing palette size aborts the sweep.
    pub async fn run(self: Arc<Self>) -> Result<Vec<SweepOutput>, Error> {
        let max_colors = self.sweep.max_colors;
        if max_colors == 0 {
            return Err(kquant::Error::InvalidColorCount(max_colors).into());
        }
        info!(max_colors, max_jobs = self.sweep.max_jobs, "starting sweep");

        let mut handles: Vec<JoinHandle<Result<SweepOutput, Error>>> = (1..=max_colors)
            .map(|colors| {
                let service = Arc::clone(&self);
                tokio::spawn(async move { service.render_colors(colors).await })
            })
            .collect();

        let mut outputs = Vec::with_capacity(max_colors);
        for index in 0..handles.len() {
            let result = (&mut handles[index]).await.map_err(Error::from);
            match result.and_then(|output| output) {
                Ok(output) => outputs.push(output),
                Err(error) => {
                    for handle in &handles[index + 1..] {
                        handle.abort();
                    }
                    return Err(error);
                }
            }
        }
        Ok(outputs)
    }

    async fn render_colors(&self, colors: usize) -> Result<SweepOutput, Error> {
        let _permit = self
            .jobs
            .acquire()
            .await
            .map_err(|_| Error::JobLimiterClosed)?;
        debug!("starting quantization to {colors} colors");

        let image = Arc::clone(&self.image);
        let pool = Arc::clone(&self.pool);
        let iterations = self.quantizer.iterations;
        let seed = self.seed.wrapping_add(colors as u64);
        let (image_path, palette_path) = output_paths(&self.sweep.output_dir, &self.stem, colors);

        let output = tokio::task::spawn_blocking(move || {
            let mut rng = WyRand::new_seed(seed);
            let reduced = kquant::quantize(&image, colors, iterations, &mut rng, &pool)?;
            save(&reduced, image_path, palette_path, colors)
        })
        .await??;

        debug!("quantization to {colors} colors complete");
        Ok(output)
    }
}

fn save(
    reduced: &ColorReducedImage,
    image_path: PathBuf,
    palette_path: PathBuf,
    colors: usize,
) -> Result<SweepOutput, Error> {
    trace!(?image_path, "writing quantized image");
    reduced
        .image
        .to_rgb_image()
        .save(&image_path)
        .map_err(|source| Error::ImageSave {
            path: image_path.clone(),
            source,
        })?;

    trace!(?palette_path, "writing palette");
    palette_swatch(&reduced.palette)
        .save(&palette_path)
        .map_err(|source| Error::ImageSave {
            path: palette_path.clone(),
            source,
        })?;

    Ok(SweepOutput {
        colors,
        palette: reduced.palette.clone(),
        image_path,
        palette_path,
    })
}

/// One pixel per palette color, left to right.
pub fn palette_swatch(palette: &Palette) -> RgbImage {
    let colors = palette.colors();
    RgbImage::from_fn(colors.len() as u32, 1, |x, _| colors[x as usize].into())
}
