//! Reading TIFF blocks: the header and the chain of IFDs it points at.
//!
//! A [`TiffBlock`] records the block's start and byte order; IFDs read through it resolve their
//! offsets against that start.
//!
//! ```
//! use std::io::Cursor;
//!
//! use tiff_exif::metadata::TiffBlock;
//! use tiff_exif::reader::BinaryReader;
//! use tiff_exif::tiff::tags::Tag;
//!
//! // A big endian block with one IFD holding Orientation = 1
//! let data = vec![
//!     b'M', b'M', 0, 42, 0, 0, 0, 8,
//!     0, 1,
//!     0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, 1, 0, 0,
//!     0, 0, 0, 0,
//! ];
//! let mut reader = BinaryReader::new(Cursor::new(data));
//! let block = TiffBlock::try_open(&mut reader, 0).unwrap();
//! let ifd = block.read_first_ifd(&mut reader).unwrap();
//! assert_eq!(ifd.integer(&mut reader, Tag::Orientation).unwrap(), Some(1));
//! ```

mod reader;

pub use reader::{TiffBlock, DEFAULT_VALUE_LIMIT};
