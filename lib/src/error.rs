use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the simplification core.
///
/// Running out of search iterations is not one of them: it is reported through
/// [`Status::Exhausted`](crate::Status::Exhausted) on the returned reduction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate segment: both endpoints are ({x}, {y})")]
    DegenerateSegment { x: f64, y: f64 },

    #[error("degenerate line: direction coefficients are both zero")]
    DegenerateLine,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
