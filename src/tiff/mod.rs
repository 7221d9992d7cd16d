//! TIFF tags, field types and decoded values.

mod error;
pub mod tags;
mod value;

pub use error::TiffFormatError;
pub use value::{Rational, SRational, Value};
