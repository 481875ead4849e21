use rayon::ThreadPoolBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Palette must have at least one color (got {0})")]
    InvalidColorCount(usize),
    #[error("Image is empty")]
    EmptyImage,
    #[error("Image of {width}x{height} pixels cannot be built from {len} pixels")]
    DimensionMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error(
        "Cannot pick {requested} distinct palette colors from an image with {distinct} distinct colors"
    )]
    NotEnoughColors { requested: usize, distinct: usize },

    #[error("Cannot build worker pool: {0}")]
    InvalidPool(#[from] ThreadPoolBuildError),
}
