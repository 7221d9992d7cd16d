use std::io::{Read, Seek};

use crate::error::{ExifResult, FormatAsAbsent};
use crate::metadata::TiffBlock;
use crate::reader::BinaryReader;
use crate::tiff::tags::Tag;
use crate::ImageFileDirectory;

const MAKE_CANON: &str = "Canon";
const MAKE_NIKON: &str = "NIKON CORPORATION";

/// `Nikon\0\x01\x00`: an IFD follows the signature, in the Exif block's byte order.
const NIKON_TYPE_1: &[u8] = b"Nikon\0\x01\x00";
/// `Nikon\0\x02\x10\0\0` and `Nikon\0\x02\x00\0\0`: a complete TIFF block follows the signature.
const NIKON_TYPE_2: [&[u8]; 2] = [b"Nikon\0\x02\x10\0\0", b"Nikon\0\x02\x00\0\0"];
const NIKON_SIGNATURE_LEN: u64 = 10;

/// How the maker note of a file was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakerNoteKind {
    /// No maker note was resolved: unknown make, no pointer, or unreadable data.
    NoVendor,
    /// A plain IFD at the maker note offset.
    Canon,
    /// A Nikon signature followed by an IFD sharing the Exif block's base and byte order.
    NikonType1,
    /// A Nikon signature followed by a nested TIFF block with its own base and byte order.
    NikonType2,
    /// A Nikon maker note without a known signature, read as a plain IFD.
    NikonPlain,
}

impl MakerNoteKind {
    /// Returns `true` for the Nikon layouts.
    pub fn is_nikon(&self) -> bool {
        matches!(
            self,
            MakerNoteKind::NikonType1 | MakerNoteKind::NikonType2 | MakerNoteKind::NikonPlain
        )
    }
}

/// Resolve the maker note of `exif_ifd`, dispatching on the camera make.
///
/// Running out of data while following the maker note is tolerated: the maker note is then
/// reported as absent and the rest of the metadata stays usable.
pub(crate) fn resolve<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    exif_ifd: &ImageFileDirectory,
    make: Option<&str>,
) -> ExifResult<(MakerNoteKind, Option<ImageFileDirectory>)> {
    let Some(offset) = exif_ifd.value_offset(Tag::MakerNote).filter(|o| *o > 0) else {
        return Ok((MakerNoteKind::NoVendor, None));
    };

    let resolved = match make {
        Some(MAKE_CANON) => exif_ifd
            .block()
            .read_ifd(reader, offset)
            .map(|ifd| Some((MakerNoteKind::Canon, ifd))),
        Some(MAKE_NIKON) => resolve_nikon(reader, exif_ifd.block(), offset),
        _ => {
            log::debug!("no maker note layout for make {make:?}");
            Ok(None)
        }
    };

    match resolved.format_as_absent() {
        Ok(Some(Some((kind, ifd)))) => {
            log::debug!("maker note {kind:?} with {} entries", ifd.entries().len());
            Ok((kind, Some(ifd)))
        }
        Ok(_) => Ok((MakerNoteKind::NoVendor, None)),
        Err(err) if err.is_end_of_file() => {
            log::warn!("maker note at +{offset} runs past the end of the stream: {err}");
            Ok((MakerNoteKind::NoVendor, None))
        }
        Err(err) => Err(err),
    }
}

fn resolve_nikon<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    block: &TiffBlock,
    offset: u32,
) -> ExifResult<Option<(MakerNoteKind, ImageFileDirectory)>> {
    reader.seek(block.offset() + u64::from(offset))?;
    let signature = reader.read_bytes(NIKON_SIGNATURE_LEN)?;

    if signature.starts_with(NIKON_TYPE_1) {
        let ifd = block.read_ifd(reader, offset + NIKON_TYPE_1.len() as u32)?;
        return Ok(Some((MakerNoteKind::NikonType1, ifd)));
    }
    if NIKON_TYPE_2.iter().any(|s| signature.starts_with(s)) {
        let nested_offset = block.offset() + u64::from(offset) + NIKON_SIGNATURE_LEN;
        let Some(nested) = TiffBlock::try_open(reader, nested_offset).format_as_absent()? else {
            return Ok(None);
        };
        let nested = nested.with_value_limit(block.value_limit());
        let ifd = nested.read_first_ifd(reader)?;
        return Ok(Some((MakerNoteKind::NikonType2, ifd)));
    }
    let ifd = block.read_ifd(reader, offset)?;
    Ok(Some((MakerNoteKind::NikonPlain, ifd)))
}
