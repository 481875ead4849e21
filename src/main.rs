mod common;
mod config;
mod sweep_service;

use std::path::PathBuf;

use clap::Parser;
use kquant::Image;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    common::{output_stem, Error},
    config::Config,
    sweep_service::SweepService,
};

/// Reduces an image to every palette size from 1 to N colors using k-means clustering.
#[derive(Parser)]
struct Args {
    /// The image to quantize.
    image: PathBuf,
    /// Path to the config file. Defaults to `colorsweep.toml` if it exists.
    #[clap(long)]
    config: Option<PathBuf>,
    /// The largest palette size to render.
    #[clap(long)]
    colors: Option<usize>,
    /// How many times each palette is refined.
    #[clap(long)]
    iterations: Option<usize>,
    /// Seed for the initial palettes.
    #[clap(long)]
    seed: Option<u64>,
    /// Directory the results are written to.
    #[clap(long)]
    output: Option<PathBuf>,
}

impl Args {
    /// Overrides config values with the ones given on the command line.
    fn apply(&self, config: &mut Config) {
        if let Some(colors) = self.colors {
            config.sweep.max_colors = colors;
        }
        if let Some(iterations) = self.iterations {
            config.quantizer.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.quantizer.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.sweep.output_dir = output.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    debug!(?config, "configuration resolved");

    info!("loading image {:?}", args.image);
    let image = image::open(&args.image)
        .map_err(|source| Error::ImageLoad {
            path: args.image.clone(),
            source,
        })?
        .to_rgb8();
    let image = Image::from_rgb_image(&image)?;
    debug!(
        width = image.width(),
        height = image.height(),
        "image decoded"
    );

    std::fs::create_dir_all(&config.sweep.output_dir).map_err(Error::OutputDir)?;
    let pool = kquant::build_pool(config.quantizer.worker_threads)?;

    let service = SweepService::new(
        config.quantizer,
        config.sweep,
        image,
        pool,
        output_stem(&args.image),
    );
    for output in service.run().await? {
        let palette: Vec<_> = output.palette.iter().map(|color| color.to_string()).collect();
        info!(
            colors = output.colors,
            image = ?output.image_path,
            palette = ?output.palette_path,
            "wrote {}",
            palette.join(" ")
        );
    }

    Ok(())
}
