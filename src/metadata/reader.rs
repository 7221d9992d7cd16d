use std::collections::HashSet;
use std::io::{Read, Seek};

use crate::error::ExifResult;
use crate::reader::{BinaryReader, Endianness};
use crate::tiff::TiffFormatError;
use crate::ImageFileDirectory;

/// `II`
const LITTLE_ENDIAN_MARKER: u16 = 0x4949;
/// `MM`
const BIG_ENDIAN_MARKER: u16 = 0x4d4d;
const TIFF_MAGIC: u16 = 42;

/// Default upper bound on the byte length of a single resolved value.
pub const DEFAULT_VALUE_LIMIT: u64 = 16 * 1024 * 1024;

/// A self-contained TIFF block: where its header starts, its byte order, and where its first IFD
/// lives.
///
/// Every offset stored inside the block is relative to [`offset`][Self::offset], so a block can
/// sit anywhere in a container and several blocks (e.g. a maker note embedding its own TIFF
/// stream) can coexist with different byte orders.
///
/// ```notest
/// let block = TiffBlock::try_open(&mut reader, 12)?;
/// let ifds = block.read_ifd_chain(&mut reader)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffBlock {
    offset: u64,
    endianness: Endianness,
    first_ifd_offset: u32,
    value_limit: u64,
}

impl TiffBlock {
    /// Create a block description without reading anything.
    pub fn new(offset: u64, endianness: Endianness, first_ifd_offset: u32) -> Self {
        Self {
            offset,
            endianness,
            first_ifd_offset,
            value_limit: DEFAULT_VALUE_LIMIT,
        }
    }

    /// Parse the header at `offset`, validating the byte order marker and the magic number.
    ///
    /// This does not read any IFD.
    pub fn try_open<R: Read + Seek>(reader: &mut BinaryReader<R>, offset: u64) -> ExifResult<Self> {
        reader.seek(offset)?;
        let marker = u16::from_be_bytes(reader.read_array::<2>()?);

        let endianness = match marker {
            LITTLE_ENDIAN_MARKER => Endianness::LittleEndian,
            BIG_ENDIAN_MARKER => Endianness::BigEndian,
            _ => return Err(TiffFormatError::TiffSignatureNotFound(marker).into()),
        };
        // Magic and first offset follow in the block's own byte order
        reader.set_endianness(endianness);

        let magic = reader.read_u16()?;
        if magic != TIFF_MAGIC {
            return Err(TiffFormatError::TiffSignatureInvalid(magic).into());
        }
        let first_ifd_offset = reader.read_u32()?;

        log::debug!("TIFF block at {offset}, {endianness:?}, first IFD at +{first_ifd_offset}");
        Ok(Self::new(offset, endianness, first_ifd_offset))
    }

    /// Set the upper bound on the byte length of any value resolved inside this block.
    pub fn with_value_limit(mut self, value_limit: u64) -> Self {
        self.value_limit = value_limit;
        self
    }

    /// Absolute offset of the header; the base of every offset inside the block.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Byte order of the block.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Offset of the first IFD, relative to the block.
    pub fn first_ifd_offset(&self) -> u32 {
        self.first_ifd_offset
    }

    /// Upper bound on the byte length of a single resolved value.
    pub fn value_limit(&self) -> u64 {
        self.value_limit
    }

    /// Read the IFD at `offset`, relative to the block.
    pub fn read_ifd<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        offset: u32,
    ) -> ExifResult<ImageFileDirectory> {
        ImageFileDirectory::read(reader, self, offset)
    }

    /// Read the IFD the header points at.
    pub fn read_first_ifd<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
    ) -> ExifResult<ImageFileDirectory> {
        self.read_ifd(reader, self.first_ifd_offset)
    }

    /// Read every IFD of the chain, following next-IFD links until one is zero.
    ///
    /// Stops early if a link points back at an IFD already read.
    pub fn read_ifd_chain<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
    ) -> ExifResult<Vec<ImageFileDirectory>> {
        let mut ifds = vec![];
        let mut seen = HashSet::new();
        let mut next = Some(self.first_ifd_offset);
        while let Some(offset) = next {
            if !seen.insert(offset) {
                log::warn!("IFD chain loops back to +{offset}, stopping");
                break;
            }
            let ifd = self.read_ifd(reader, offset)?;
            next = ifd.next_ifd_offset();
            ifds.push(ifd);
        }
        Ok(ifds)
    }
}
