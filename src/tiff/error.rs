use std::error::Error;
use std::fmt;

/// The TIFF block is not formatted properly.
///
/// This indicates that the encoder producing the file might behave incorrectly, that the input
/// has been corrupted, or that the bytes at the probed offset are not a TIFF block at all.
///
/// The list of variants may grow to incorporate errors of future features. Matching against this
/// exhaustively is not covered by interface stability guarantees.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TiffFormatError {
    /// The byte order marker is neither `II` nor `MM`.
    TiffSignatureNotFound(u16),
    /// The magic number following the byte order marker is not 42.
    TiffSignatureInvalid(u16),
    /// A value is larger than the configured limit.
    ValueTooLarge {
        /// Tag of the entry.
        tag: u16,
        /// Byte length of its value.
        length: u64,
    },
}

impl fmt::Display for TiffFormatError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use self::TiffFormatError::*;
        match *self {
            TiffSignatureNotFound(marker) => {
                write!(fmt, "TIFF signature not found: byte order marker {marker:#06x}.")
            }
            TiffSignatureInvalid(magic) => write!(fmt, "TIFF signature invalid: magic {magic}."),
            ValueTooLarge { tag, length } => {
                write!(fmt, "Value of tag {tag:#06x} is too large: {length} bytes.")
            }
        }
    }
}

impl Error for TiffFormatError {}
