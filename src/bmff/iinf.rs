use std::io::{Read, Seek};

use crate::bmff::{BoxHeader, FourCC, FullBoxHeader};
use crate::error::ExifResult;
use crate::reader::BinaryReader;

/// Item info box `iinf`. Its entries follow as `infe` child boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfoBox {
    /// Box header. `data_offset` points at the first entry.
    pub header: BoxHeader,
    /// Version and flags.
    pub full: FullBoxHeader,
    /// Number of `infe` boxes that follow.
    pub entry_count: u32,
}

impl ItemInfoBox {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        mut header: BoxHeader,
    ) -> ExifResult<Self> {
        let full = FullBoxHeader::read(reader)?;
        let entry_count = match full.version {
            0 => reader.read_u16()?.into(),
            _ => reader.read_u32()?,
        };
        header.sync(reader)?;
        Ok(Self {
            header,
            full,
            entry_count,
        })
    }
}

/// Item info entry `infe`.
///
/// Only versions 2 and later carry the item fields; older entries leave them unset and are
/// skipped by size.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfoEntry {
    /// Box header.
    pub header: BoxHeader,
    /// Version and flags.
    pub full: FullBoxHeader,
    /// Item identifier.
    pub item_id: Option<u32>,
    /// Item type, `Exif` for the Exif payload.
    pub item_type: Option<FourCC>,
    /// Item name.
    pub item_name: Option<String>,
}

impl ItemInfoEntry {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        mut header: BoxHeader,
    ) -> ExifResult<Self> {
        let full = FullBoxHeader::read(reader)?;
        let mut entry = Self {
            header,
            full,
            item_id: None,
            item_type: None,
            item_name: None,
        };
        if full.version >= 2 {
            let item_id = match full.version {
                2 => reader.read_u16()?.into(),
                _ => reader.read_u32()?,
            };
            // item_protection_index
            reader.skip(2)?;
            let item_type = FourCC(reader.read_array()?);
            let name = reader.read_bytes_until(0)?;

            entry.item_id = Some(item_id);
            entry.item_type = Some(item_type);
            entry.item_name = Some(String::from_utf8_lossy(&name).into_owned());
        }
        header.sync(reader)?;
        entry.header = header;
        Ok(entry)
    }

    /// Returns `true` if the entry describes an Exif payload.
    pub fn is_exif(&self) -> bool {
        self.item_type == Some(FourCC::EXIF)
    }
}
