#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod reader;
pub mod bmff;
pub mod error;
pub mod exif;
pub mod geo;
mod ifd;
pub mod metadata;
pub mod tiff;

pub use exif::{Container, Directory, MakerNoteKind, Metadata, ParseOptions};
pub use ifd::{DirectoryEntry, ImageFileDirectory};
