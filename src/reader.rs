//! The seekable byte source all parsers read from.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use bytes::Bytes;

use crate::error::{ExifError, ExifResult};

/// Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Little Endian
    LittleEndian,
    /// Big Endian
    BigEndian,
}

/// A seekable reader whose multi-byte reads follow a switchable byte order.
///
/// There is a single cursor: parsers that follow offsets seek it to absolute positions and callers
/// must not interleave two parses over the same `BinaryReader`. Use one reader per file when
/// extracting metadata in parallel.
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    endianness: Endianness,
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Wrap a reader. Multi-byte reads are big endian until changed.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            endianness: Endianness::BigEndian,
        }
    }

    /// The byte order currently applied to multi-byte reads.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order applied to subsequent multi-byte reads.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> ExifResult<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Advance the cursor by a set amount, which may be negative.
    pub fn skip(&mut self, amount: i64) -> ExifResult<()> {
        self.inner.seek(SeekFrom::Current(amount))?;
        Ok(())
    }

    /// The absolute offset of the cursor.
    pub fn position(&mut self) -> ExifResult<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Total length of the stream. The cursor position is preserved.
    pub fn stream_len(&mut self) -> ExifResult<u64> {
        let position = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        if position != len {
            self.inner.seek(SeekFrom::Start(position))?;
        }
        Ok(len)
    }

    /// Read a u8 from the cursor, advancing the internal state by 1 byte.
    pub fn read_u8(&mut self) -> ExifResult<u8> {
        Ok(self.inner.read_u8()?)
    }

    /// Read a i8 from the cursor, advancing the internal state by 1 byte.
    pub fn read_i8(&mut self) -> ExifResult<i8> {
        Ok(self.inner.read_i8()?)
    }

    /// Read a u16 in the current byte order.
    pub fn read_u16(&mut self) -> ExifResult<u16> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_u16::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_u16::<BigEndian>()?),
        }
    }

    /// Read a i16 in the current byte order.
    pub fn read_i16(&mut self) -> ExifResult<i16> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_i16::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_i16::<BigEndian>()?),
        }
    }

    /// Read a u32 in the current byte order.
    pub fn read_u32(&mut self) -> ExifResult<u32> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_u32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_u32::<BigEndian>()?),
        }
    }

    /// Read a i32 in the current byte order.
    pub fn read_i32(&mut self) -> ExifResult<i32> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_i32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_i32::<BigEndian>()?),
        }
    }

    /// Read a u64 in the current byte order.
    pub fn read_u64(&mut self) -> ExifResult<u64> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_u64::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_u64::<BigEndian>()?),
        }
    }

    /// Read a f32 in the current byte order.
    pub fn read_f32(&mut self) -> ExifResult<f32> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_f32::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_f32::<BigEndian>()?),
        }
    }

    /// Read a f64 in the current byte order.
    pub fn read_f64(&mut self) -> ExifResult<f64> {
        match self.endianness {
            Endianness::LittleEndian => Ok(self.inner.read_f64::<LittleEndian>()?),
            Endianness::BigEndian => Ok(self.inner.read_f64::<BigEndian>()?),
        }
    }

    /// Read exactly `len` bytes.
    ///
    /// Fails with [`ExifError::EndOfFile`] before allocating if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: u64) -> ExifResult<Bytes> {
        let available = self.remaining()?;
        if len > available {
            return Err(ExifError::EndOfFile {
                requested: len,
                available,
            });
        }
        let mut buf = vec![0; len as usize];
        self.inner.read_exact(&mut buf)?;
        Ok(buf.into())
    }

    /// Read bytes up to `terminator`. The terminator is consumed but not returned.
    ///
    /// Reaching the end of the stream before the terminator is an error.
    pub fn read_bytes_until(&mut self, terminator: u8) -> ExifResult<Bytes> {
        let mut buf = Vec::new();
        loop {
            let byte = self.inner.read_u8()?;
            if byte == terminator {
                return Ok(buf.into());
            }
            buf.push(byte);
        }
    }

    /// Read a fixed number of bytes, e.g. a four character code or a raw entry field.
    pub fn read_array<const N: usize>(&mut self) -> ExifResult<[u8; N]> {
        let mut buf = [0; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn remaining(&mut self) -> ExifResult<u64> {
        let position = self.position()?;
        Ok(self.stream_len()?.saturating_sub(position))
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
