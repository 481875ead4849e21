use std::{
    io,
    path::{Path, PathBuf},
};

use image::ImageError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read config file {path:?}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },
    #[error("Config TOML deserialization error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Error while loading image {path:?}: {source}")]
    ImageLoad { path: PathBuf, source: ImageError },
    #[error("Error while saving image {path:?}: {source}")]
    ImageSave { path: PathBuf, source: ImageError },
    #[error("Cannot create output directory: {0}")]
    OutputDir(io::Error),

    #[error("Quantization error: {0}")]
    Quantize(#[from] kquant::Error),
    #[error("Quantization job exited unexpectedly: {0}")]
    JobExited(#[from] JoinError),
    #[error("Job limiter is closed")]
    JobLimiterClosed,
}

/// Paths of the quantized image and its palette swatch for a given color count.
pub fn output_paths(output_dir: &Path, stem: &str, colors: usize) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{stem}-k{colors}.png")),
        output_dir.join(format!("{stem}-k{colors}-palette.png")),
    )
}

/// The file stem outputs are named after, `image` if the input path has none.
pub fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_include_color_count() {
        let (image, palette) = output_paths(Path::new("out"), "cat", 12);
        assert_eq!(image, Path::new("out/cat-k12.png"));
        assert_eq!(palette, Path::new("out/cat-k12-palette.png"));
    }

    #[test]
    fn stem_comes_from_file_name() {
        assert_eq!(output_stem(Path::new("photos/cat.jpeg")), "cat");
        assert_eq!(output_stem(Path::new("")), "image");
    }
}
