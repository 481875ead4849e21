use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::common::Error;

pub const PATH: &str = "colorsweep.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quantizer: QuantizerConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl Config {
    /// Loads the config from `path`. Without an explicit path, [`PATH`] is used if it exists
    /// and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(path) => path,
            None if Path::new(PATH).exists() => Path::new(PATH),
            None => {
                debug!("no config file found, using defaults");
                return Ok(Self::default());
            }
        };

        debug!("loading config from {path:?}");
        let config = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_owned(),
            source,
        })?;
        Ok(toml::from_str(&config)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantizerConfig {
    /// How many times the palette is refined after seeding.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// The number of threads used for per-pixel work. `0` uses one thread per CPU.
    #[serde(default)]
    pub worker_threads: usize,
    /// Seed for picking the initial palettes. A random seed is used when this is not set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            worker_threads: 0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Images are rendered for every palette size from 1 up to and including this number.
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    /// The maximum number of palette sizes that are quantized at a time.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    /// Where the quantized images and their palettes are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_colors: default_max_colors(),
            max_jobs: default_max_jobs(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_iterations() -> usize {
    10
}

fn default_max_colors() -> usize {
    8
}

fn default_max_jobs() -> usize {
    2
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}
