use std::io::{Read, Seek};

use crate::bmff::{read_box, BmffBox, FourCC};
use crate::error::{ExifError, ExifResult, FormatAsAbsent};
use crate::reader::{BinaryReader, Endianness};

/// Start of image
const SOI: u16 = 0xffd8;
/// Application segment 1
const APP1: u16 = 0xffe1;
/// Start of scan
const SOS: u16 = 0xffda;
/// `Exif\0\0`, opening an APP1 segment that holds a TIFF block.
const EXIF_MARKER: [u8; 6] = *b"Exif\0\0";
/// Bytes preceding the TIFF block inside a HEIC Exif item.
const HEIC_EXIF_HEADER_LEN: u64 = 10;

/// The kind of file a TIFF block was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// An APP1 segment of a JPEG stream.
    Jpeg,
    /// The Exif item of a HEIC file.
    Heic,
    /// Neither; the file is assumed to be a TIFF block itself, e.g. a raw camera file.
    RawTiff,
}

/// Find where the TIFF block starts, trying JPEG, then HEIC, then falling back to offset 0.
pub(crate) fn locate<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
) -> ExifResult<(Container, u64)> {
    reader.set_endianness(Endianness::BigEndian);
    if let Some(offset) = find_in_jpeg(reader)? {
        log::debug!("Exif APP1 segment, TIFF block at {offset}");
        return Ok((Container::Jpeg, offset));
    }
    if let Some(offset) = find_in_heic(reader).format_as_absent()?.flatten() {
        log::debug!("HEIC Exif item, TIFF block at {offset}");
        return Ok((Container::Heic, offset));
    }
    log::debug!("no container found, reading TIFF block at 0");
    Ok((Container::RawTiff, 0))
}

/// Scan JPEG segments up to the start of scan for an Exif APP1 segment.
fn find_in_jpeg<R: Read + Seek>(reader: &mut BinaryReader<R>) -> ExifResult<Option<u64>> {
    reader.seek(0)?;
    if reader.read_u16()? != SOI {
        return Ok(None);
    }
    loop {
        let marker = reader.read_u16()?;
        let size = reader.read_u16()?;
        if marker == SOS {
            return Ok(None);
        }
        if size < 2 {
            log::warn!("JPEG segment {marker:#06x} with invalid size {size}");
            return Ok(None);
        }
        let payload = reader.position()?;
        if marker == APP1 && size >= 8 && reader.read_array::<6>()? == EXIF_MARKER {
            return Ok(Some(reader.position()?));
        }
        // Other APP1 payloads (e.g. XMP) are passed over like any segment
        reader.seek(payload + u64::from(size) - 2)?;
    }
}

/// Walk `ftyp` and `meta` of a HEIC file to the first extent of its Exif item.
fn find_in_heic<R: Read + Seek>(reader: &mut BinaryReader<R>) -> ExifResult<Option<u64>> {
    reader.seek(0)?;
    let BmffBox::FileType(ftyp) = read_box(reader)? else {
        return Ok(None);
    };
    if ftyp.major_brand != FourCC::HEIC {
        log::debug!("major brand {} is not HEIC", ftyp.major_brand);
        return Ok(None);
    }

    reader.seek(ftyp.header.end()?)?;
    let BmffBox::Meta(meta) = read_box(reader)? else {
        return Ok(None);
    };

    let mut exif_item = None;
    let mut offset = meta.header.data_offset;
    while offset < meta.header.size {
        reader.seek(
            meta.header
                .start
                .checked_add(offset)
                .ok_or(ExifError::InvalidBox("box extends past u64"))?,
        )?;
        let child = read_box(reader)?;
        match &child {
            BmffBox::ItemInfo(iinf) => {
                for _ in 0..iinf.entry_count {
                    let entry = read_box(reader)?;
                    if let BmffBox::ItemInfoEntry(infe) = &entry {
                        if infe.is_exif() {
                            exif_item = infe.item_id;
                        }
                    }
                    entry.skip(reader)?;
                }
            }
            BmffBox::ItemLocation(iloc) => {
                let extent = exif_item
                    .and_then(|item_id| iloc.item(item_id))
                    .and_then(|item| item.extents.first());
                return match extent {
                    Some(extent) => extent
                        .offset
                        .checked_add(HEIC_EXIF_HEADER_LEN)
                        .map(Some)
                        .ok_or(ExifError::InvalidBox("Exif item extends past u64")),
                    None => {
                        log::warn!("iloc has no extent for Exif item {exif_item:?}");
                        Ok(None)
                    }
                };
            }
            _ => {}
        }
        offset = offset
            .checked_add(child.size())
            .ok_or(ExifError::InvalidBox("box extends past u64"))?;
    }
    Ok(None)
}
