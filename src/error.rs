use plotters::drawing::DrawingAreaErrorKind;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the catalog pipeline and renderers.
///
/// Field-level problems (unparseable dates, missing categoricals) never reach
/// this type; they are absorbed into nulls or sentinel values during cleaning.
#[derive(Error, Debug)]
pub enum LensError {
    #[error("dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

// Plotters errors are generic over the backend; flatten them to a message so
// renderers can use `?` against any drawing area.
impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for LensError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        LensError::Chart(err.to_string())
    }
}

pub type Result<T, E = LensError> = std::result::Result<T, E>;
