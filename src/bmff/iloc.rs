use std::io::{Read, Seek};

use num_enum::TryFromPrimitive;

use crate::bmff::{BoxHeader, FullBoxHeader};
use crate::error::{ExifError, ExifResult};
use crate::reader::BinaryReader;

/// Versions of the `iloc` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum IlocVersion {
    /// Version 0
    Zero = 0,
    /// Version 1, adds construction method and extent index
    One = 1,
    /// Version 2, widens item ids and counts to 32 bits
    Two = 2,
}

/// Which version-dependent fields are present and how wide they are.
struct IlocLayout {
    /// Width in bytes of item ids and the item count.
    id_width: u8,
    /// Each item carries a 2-byte construction method.
    construction_method: bool,
    /// The low nibble of the sizes field is the extent index size.
    index: bool,
}

impl IlocVersion {
    const fn layout(self) -> IlocLayout {
        match self {
            IlocVersion::Zero => IlocLayout {
                id_width: 2,
                construction_method: false,
                index: false,
            },
            IlocVersion::One => IlocLayout {
                id_width: 2,
                construction_method: true,
                index: true,
            },
            IlocVersion::Two => IlocLayout {
                id_width: 4,
                construction_method: true,
                index: true,
            },
        }
    }
}

/// Widths in bytes of an extent's offset and length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSize {
    /// Field absent, value 0
    Zero,
    Four,
    Eight,
}

impl FieldSize {
    fn read<R: Read + Seek>(self, reader: &mut BinaryReader<R>) -> ExifResult<u64> {
        match self {
            FieldSize::Zero => Ok(0),
            FieldSize::Four => Ok(reader.read_u32()?.into()),
            FieldSize::Eight => reader.read_u64(),
        }
    }
}

impl TryFrom<u8> for FieldSize {
    type Error = ExifError;

    fn try_from(value: u8) -> ExifResult<Self> {
        match value {
            0 => Ok(Self::Zero),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => Err(ExifError::InvalidBox("iloc field width must be 0, 4 or 8")),
        }
    }
}

/// The four nibble-packed field widths of an `iloc` box, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IlocSizes {
    /// Width of each extent offset.
    pub offset_size: u8,
    /// Width of each extent length.
    pub length_size: u8,
    /// Width of each item's base offset.
    pub base_offset_size: u8,
    /// Width of each extent index. Always 0 for version 0.
    pub index_size: u8,
}

impl IlocSizes {
    /// Unpack the 16-bit sizes field, high nibble first.
    pub fn unpack(packed: u16, version: IlocVersion) -> Self {
        let nibble = |shift: u16| ((packed >> shift) & 0xf) as u8;
        Self {
            offset_size: nibble(12),
            length_size: nibble(8),
            base_offset_size: nibble(4),
            index_size: if version.layout().index { nibble(0) } else { 0 },
        }
    }
}

/// One (offset, length) byte range of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// Offset of the range.
    pub offset: u64,
    /// Length of the range; 0 means up to the end of the source.
    pub length: u64,
}

/// The location of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Item identifier, matching an `infe` entry.
    pub item_id: u32,
    /// Byte ranges making up the item.
    pub extents: Vec<Extent>,
}

/// Item location box `iloc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLocationBox {
    /// Box header.
    pub header: BoxHeader,
    /// Version and flags.
    pub full: FullBoxHeader,
    /// Field widths.
    pub sizes: IlocSizes,
    /// Located items.
    pub items: Vec<Item>,
}

impl ItemLocationBox {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        mut header: BoxHeader,
    ) -> ExifResult<Self> {
        let full = FullBoxHeader::read(reader)?;
        let version = IlocVersion::try_from_primitive(full.version)
            .map_err(|_| ExifError::UnsupportedBox("iloc version above 2"))?;
        let layout = version.layout();

        let sizes = IlocSizes::unpack(reader.read_u16()?, version);
        let offset_size = FieldSize::try_from(sizes.offset_size)?;
        let length_size = FieldSize::try_from(sizes.length_size)?;

        let item_count = read_id(reader, layout.id_width)?;
        let mut items = vec![];
        for _ in 0..item_count {
            let item_id = read_id(reader, layout.id_width)?;
            if layout.construction_method {
                reader.skip(2)?;
            }
            // data_reference_index
            reader.skip(2)?;
            reader.skip(sizes.base_offset_size.into())?;

            let extent_count = reader.read_u16()?;
            let mut extents = Vec::with_capacity(extent_count as usize);
            for _ in 0..extent_count {
                if sizes.index_size > 0 {
                    reader.skip(sizes.index_size.into())?;
                }
                let offset = offset_size.read(reader)?;
                let length = length_size.read(reader)?;
                extents.push(Extent { offset, length });
            }
            items.push(Item { item_id, extents });
        }

        header.sync(reader)?;
        Ok(Self {
            header,
            full,
            sizes,
            items,
        })
    }

    /// Look up an item by id.
    pub fn item(&self, item_id: u32) -> Option<&Item> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

fn read_id<R: Read + Seek>(reader: &mut BinaryReader<R>, width: u8) -> ExifResult<u32> {
    match width {
        2 => Ok(reader.read_u16()?.into()),
        _ => reader.read_u32(),
    }
}
