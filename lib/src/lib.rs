mod error;
pub mod geometry;
mod reporters;
mod search;
pub mod series;
mod simplify;

pub use error::{Error, Result};
pub use geometry::{line_through, perpendicular_distance, Line, Point};
pub use reporters::*;
pub use search::*;
pub use series::{CsvCodec, Format, JsonCodec, SeriesCodec};
pub use simplify::*;
