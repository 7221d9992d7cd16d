//! A minimal ISOBMFF box reader, enough to walk the item metadata of a HEIC file.
//!
//! Boxes are read as a flat stream: a parent's children are found by reading sibling boxes from
//! the parent's data offset and advancing by each child's size. A box whose payload is not needed
//! can always be passed over with [`BmffBox::skip`].

mod iinf;
mod iloc;

use std::fmt;
use std::io::{Read, Seek};

use crate::error::{ExifError, ExifResult};
use crate::reader::{BinaryReader, Endianness};

pub use iinf::{ItemInfoBox, ItemInfoEntry};
pub use iloc::{Extent, IlocSizes, IlocVersion, Item, ItemLocationBox};

/// A four character code naming a box type or brand.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// `ftyp`
    pub const FTYP: FourCC = FourCC(*b"ftyp");
    /// `meta`
    pub const META: FourCC = FourCC(*b"meta");
    /// `iinf`
    pub const IINF: FourCC = FourCC(*b"iinf");
    /// `infe`
    pub const INFE: FourCC = FourCC(*b"infe");
    /// `iloc`
    pub const ILOC: FourCC = FourCC(*b"iloc");
    /// `uuid`
    pub const UUID: FourCC = FourCC(*b"uuid");
    /// The HEIC major brand.
    pub const HEIC: FourCC = FourCC(*b"heic");
    /// Item type of an Exif payload.
    pub const EXIF: FourCC = FourCC(*b"Exif");
}

impl From<[u8; 4]> for FourCC {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

impl PartialEq<&[u8; 4]> for FourCC {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// The common header of every box.
///
/// `data_offset` starts as the header length and grows as typed readers consume the payload, so
/// `size - data_offset` is always what is left of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    /// Absolute offset of the first byte of the box.
    pub start: u64,
    /// Box type.
    pub box_type: FourCC,
    /// Declared size of the whole box, header included.
    pub size: u64,
    /// Bytes of the box read so far, counted from `start`.
    pub data_offset: u64,
    /// Extended type of `uuid` boxes.
    pub user_type: Option<[u8; 16]>,
}

impl BoxHeader {
    /// 4-byte size + 4-byte type
    const MIN_SIZE: u64 = 8;

    /// Read a box header at the cursor.
    ///
    /// The declared 32-bit size is masked to its low 16 bits. Encoders seen in the wild populate
    /// only those bits for the boxes read here, and the walk compares sizes on that basis. A size
    /// of 1 is followed by the real 64-bit size; a size of 0 means the box runs to the end of the
    /// stream.
    pub fn read<R: Read + Seek>(reader: &mut BinaryReader<R>) -> ExifResult<Self> {
        reader.set_endianness(Endianness::BigEndian);
        let start = reader.position()?;
        let size32 = reader.read_u32()? & 0xffff;
        let box_type = FourCC(reader.read_array()?);

        let mut data_offset = Self::MIN_SIZE;
        let size = match size32 {
            0 => reader.stream_len()?.saturating_sub(start),
            1 => {
                data_offset += 8;
                reader.read_u64()?
            }
            size => u64::from(size),
        };

        let user_type = if box_type == FourCC::UUID {
            data_offset += 16;
            Some(reader.read_array()?)
        } else {
            None
        };

        if size < data_offset {
            return Err(ExifError::InvalidBox("box size smaller than its header"));
        }
        Ok(Self {
            start,
            box_type,
            size,
            data_offset,
            user_type,
        })
    }

    /// Absolute offset of the first byte after the box.
    pub fn end(&self) -> ExifResult<u64> {
        self.start
            .checked_add(self.size)
            .ok_or(ExifError::InvalidBox("box extends past u64"))
    }

    /// Record that the payload has been read up to the cursor.
    fn sync<R: Read + Seek>(&mut self, reader: &mut BinaryReader<R>) -> ExifResult<()> {
        self.data_offset = reader.position()? - self.start;
        Ok(())
    }
}

/// The version and flags word that opens a full box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullBoxHeader {
    /// Top byte of the word.
    pub version: u8,
    /// Low 24 bits of the word.
    pub flags: u32,
}

impl FullBoxHeader {
    pub(crate) fn read<R: Read + Seek>(reader: &mut BinaryReader<R>) -> ExifResult<Self> {
        let word = reader.read_u32()?;
        Ok(Self {
            version: (word >> 24) as u8,
            flags: word & 0x00ff_ffff,
        })
    }
}

/// File type box `ftyp`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTypeBox {
    /// Box header.
    pub header: BoxHeader,
    /// Major brand, `heic` for HEIC files.
    pub major_brand: FourCC,
    /// Minor version.
    pub minor_version: u32,
    /// Brands filling the rest of the box.
    pub compatible_brands: Vec<FourCC>,
}

impl FileTypeBox {
    fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        mut header: BoxHeader,
    ) -> ExifResult<Self> {
        let major_brand = FourCC(reader.read_array()?);
        let minor_version = reader.read_u32()?;
        header.data_offset += 8;

        let brand_count = header.size.saturating_sub(header.data_offset) / 4;
        let mut compatible_brands = vec![];
        for _ in 0..brand_count {
            compatible_brands.push(FourCC(reader.read_array()?));
        }
        header.sync(reader)?;
        Ok(Self {
            header,
            major_brand,
            minor_version,
            compatible_brands,
        })
    }
}

/// Meta box `meta`: a full box whose payload is a sequence of child boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaBox {
    /// Box header. `data_offset` points at the first child.
    pub header: BoxHeader,
    /// Version and flags.
    pub full: FullBoxHeader,
}

/// A box read by [`read_box`], typed when the walk needs its payload.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BmffBox {
    /// `ftyp`
    FileType(FileTypeBox),
    /// `meta`
    Meta(MetaBox),
    /// `iinf`
    ItemInfo(ItemInfoBox),
    /// `infe`
    ItemInfoEntry(ItemInfoEntry),
    /// `iloc`
    ItemLocation(ItemLocationBox),
    /// Any other box; only its header is read.
    Other(BoxHeader),
}

impl BmffBox {
    /// The header, with `data_offset` covering everything read so far.
    pub fn header(&self) -> &BoxHeader {
        match self {
            BmffBox::FileType(b) => &b.header,
            BmffBox::Meta(b) => &b.header,
            BmffBox::ItemInfo(b) => &b.header,
            BmffBox::ItemInfoEntry(b) => &b.header,
            BmffBox::ItemLocation(b) => &b.header,
            BmffBox::Other(header) => header,
        }
    }

    /// Declared size of the box.
    pub fn size(&self) -> u64 {
        self.header().size
    }

    /// Advance the cursor past the unread remainder of the box.
    pub fn skip<R: Read + Seek>(&self, reader: &mut BinaryReader<R>) -> ExifResult<()> {
        let header = self.header();
        let remaining = header.size.saturating_sub(header.data_offset);
        let remaining =
            i64::try_from(remaining).map_err(|_| ExifError::InvalidBox("box too large to skip"))?;
        reader.skip(remaining)
    }
}

/// Read the box at the cursor and the payload of the types this module knows.
pub fn read_box<R: Read + Seek>(reader: &mut BinaryReader<R>) -> ExifResult<BmffBox> {
    let header = BoxHeader::read(reader)?;
    log::debug!(
        "box {} at {} size {}",
        header.box_type,
        header.start,
        header.size
    );

    let parsed = match header.box_type {
        FourCC::FTYP => BmffBox::FileType(FileTypeBox::read(reader, header)?),
        FourCC::META => {
            let mut header = header;
            let full = FullBoxHeader::read(reader)?;
            header.data_offset += 4;
            BmffBox::Meta(MetaBox { header, full })
        }
        FourCC::IINF => BmffBox::ItemInfo(ItemInfoBox::read(reader, header)?),
        FourCC::INFE => BmffBox::ItemInfoEntry(ItemInfoEntry::read(reader, header)?),
        FourCC::ILOC => BmffBox::ItemLocation(ItemLocationBox::read(reader, header)?),
        _ => BmffBox::Other(header),
    };
    Ok(parsed)
}
