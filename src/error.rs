use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Failures of the I/O surfaces (catalog loading, payload parsing).
///
/// The schedule utilities themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
