//! Error handling.

use thiserror::Error;

use crate::tiff::TiffFormatError;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExifError {
    /// End of file error.
    #[error("End of File: expected to read {requested} bytes, {available} available")]
    EndOfFile {
        /// Number of bytes the caller asked for.
        requested: u64,
        /// Number of bytes left in the stream.
        available: u64,
    },

    /// IO Error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// A TIFF block is not formatted properly.
    #[error(transparent)]
    InternalTIFFError(#[from] TiffFormatError),

    /// An ISOBMFF box is not formatted properly.
    #[error("Invalid box: {0}")]
    InvalidBox(&'static str),

    /// An ISOBMFF box uses a version or layout we do not read.
    #[error("Unsupported box: {0}")]
    UnsupportedBox(&'static str),
}

impl ExifError {
    /// Returns `true` if the error describes malformed or unsupported input rather than a failure
    /// of the underlying byte source.
    ///
    /// Format errors are reported as absent metadata by [`Metadata`][crate::Metadata].
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ExifError::InternalTIFFError(_)
                | ExifError::InvalidBox(_)
                | ExifError::UnsupportedBox(_)
        )
    }

    /// Returns `true` if the byte source ended before a read could complete.
    pub fn is_end_of_file(&self) -> bool {
        match self {
            ExifError::EndOfFile { .. } => true,
            ExifError::IOError(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

/// Crate-specific result type.
pub type ExifResult<T> = std::result::Result<T, ExifError>;

/// Turns format errors into an absent value while keeping I/O failures.
pub(crate) trait FormatAsAbsent<T> {
    fn format_as_absent(self) -> ExifResult<Option<T>>;
}

impl<T> FormatAsAbsent<T> for ExifResult<T> {
    fn format_as_absent(self) -> ExifResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_format_error() => {
                log::debug!("treating format error as absent: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_errors_become_absent() {
        let res: ExifResult<u32> = Err(TiffFormatError::TiffSignatureInvalid(43).into());
        assert!(res.format_as_absent().unwrap().is_none());

        let res: ExifResult<u32> = Err(ExifError::InvalidBox("bad width"));
        assert!(res.format_as_absent().unwrap().is_none());
    }

    #[test]
    fn test_io_errors_are_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let res: ExifResult<u32> = Err(io.into());
        let err = res.format_as_absent().unwrap_err();
        assert!(err.is_end_of_file());
        assert!(!err.is_format_error());
    }
}
