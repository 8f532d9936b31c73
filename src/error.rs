use thiserror::Error;

/// Errors returned by the image-level encode/decode entry points.
///
/// Per-block encoding cannot fail. Everything here is a rejected call: no
/// partial output is ever produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A buffer does not match the declared block grid.
    #[error("buffer holds {actual} bytes, expected {expected} for the declared block grid")]
    InvalidBufferLength { expected: usize, actual: usize },

    /// The block grid is zero blocks wide or high.
    #[error("block grid must be at least 1x1, got {blocks_wide}x{blocks_high}")]
    ZeroDimension { blocks_wide: usize, blocks_high: usize },

    /// The block grid is too large to address in memory.
    #[error("block grid {blocks_wide}x{blocks_high} is too large")]
    GridTooLarge { blocks_wide: usize, blocks_high: usize },

    /// A quality tier that is not one of Fast, Balanced or BestQuality.
    #[error("unsupported quality tier: {0:?}")]
    UnsupportedQuality(String),

    /// The operation was cancelled through its [`CancellationToken`](crate::CancellationToken).
    #[error("encoding was cancelled")]
    Cancelled,

    /// A worker pool with the requested thread count could not be created.
    #[cfg(feature = "rayon")]
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
