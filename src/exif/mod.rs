//! The Exif façade: locate the TIFF block of a file, resolve its directories and answer typed
//! queries about the camera and the shot.
//!
//! ```no_run
//! use tiff_exif::exif::{Directory, Metadata};
//! use tiff_exif::tiff::tags::Tag;
//!
//! # fn main() -> tiff_exif::error::ExifResult<()> {
//! let Some(mut metadata) = Metadata::open("DSC_0001.NEF")? else {
//!     return Ok(());
//! };
//! println!("{:?} {:?}", metadata.model()?, metadata.lens()?);
//! if let Some(iso) = metadata.value(Directory::Exif, Tag::IsoSpeed)? {
//!     println!("ISO {:?}", iso.as_i64());
//! }
//! # Ok(())
//! # }
//! ```

mod container;
mod makernote;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use bytes::Bytes;

pub use container::Container;
pub use makernote::MakerNoteKind;

use crate::error::{ExifResult, FormatAsAbsent};
use crate::geo::GeodeticPoint;
use crate::metadata::{TiffBlock, DEFAULT_VALUE_LIMIT};
use crate::reader::BinaryReader;
use crate::tiff::tags::{CanonTag, GpsTag, NikonTag, Tag};
use crate::tiff::{Rational, Value};
use crate::ImageFileDirectory;

/// Options for [`Metadata::parse_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Values whose byte length exceeds this are reported as absent. Defaults to 16 MiB.
    pub max_value_length: u64,
    /// Whether to follow the MakerNote tag. Defaults to `true`.
    pub resolve_maker_note: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_value_length: DEFAULT_VALUE_LIMIT,
            resolve_maker_note: true,
        }
    }
}

/// The directories [`Metadata`] resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    /// The primary image directory.
    Ifd0,
    /// The thumbnail directory following IFD0.
    Ifd1,
    /// The Exif sub-directory.
    Exif,
    /// The GPS sub-directory.
    Gps,
    /// The vendor maker note.
    MakerNote,
}

/// Metadata of one file.
///
/// All directories are read when the metadata is parsed; values are decoded on demand from the
/// owned reader, which is why the accessors take `&mut self`. Every accessor returns `Ok(None)`
/// when a directory or tag it depends on is absent or malformed, and an error only when reading
/// the source fails.
#[derive(Debug)]
pub struct Metadata<R> {
    reader: BinaryReader<R>,
    container: Container,
    block: TiffBlock,
    ifd0: ImageFileDirectory,
    ifd1: Option<ImageFileDirectory>,
    exif_ifd: Option<ImageFileDirectory>,
    gps_ifd: Option<ImageFileDirectory>,
    maker_note: Option<ImageFileDirectory>,
    maker_note_kind: MakerNoteKind,
}

impl Metadata<BufReader<File>> {
    /// Open a file and parse its metadata.
    pub fn open(path: impl AsRef<Path>) -> ExifResult<Option<Self>> {
        Self::parse(BufReader::new(File::open(path)?))
    }
}

impl Metadata<Cursor<Bytes>> {
    /// Parse metadata out of an in-memory file.
    pub fn from_bytes(data: Bytes) -> ExifResult<Option<Self>> {
        Self::parse(Cursor::new(data))
    }
}

impl<R: Read + Seek> Metadata<R> {
    /// Parse metadata with default options.
    ///
    /// Returns `Ok(None)` if no TIFF block could be found.
    pub fn parse(reader: R) -> ExifResult<Option<Self>> {
        Self::parse_with_options(reader, ParseOptions::default())
    }

    /// Parse metadata.
    ///
    /// Returns `Ok(None)` if no TIFF block could be found.
    pub fn parse_with_options(reader: R, options: ParseOptions) -> ExifResult<Option<Self>> {
        let mut reader = BinaryReader::new(reader);
        let (container, offset) = container::locate(&mut reader)?;
        let Some(block) = TiffBlock::try_open(&mut reader, offset).format_as_absent()? else {
            log::debug!("no TIFF block at {offset} in {container:?}");
            return Ok(None);
        };
        let block = block.with_value_limit(options.max_value_length);

        let ifd0 = block.read_first_ifd(&mut reader)?;
        let ifd1 = match ifd0.next_ifd_offset() {
            Some(next) => Some(block.read_ifd(&mut reader, next)?),
            None => None,
        };
        let exif_ifd = read_sub_ifd(&mut reader, &ifd0, Tag::ExifIfd)?;
        let gps_ifd = read_sub_ifd(&mut reader, &ifd0, Tag::GpsIfd)?;

        let (maker_note_kind, maker_note) = match &exif_ifd {
            Some(exif_ifd) if options.resolve_maker_note => {
                let make = ifd0
                    .string(&mut reader, Tag::Make)
                    .format_as_absent()?
                    .flatten();
                makernote::resolve(&mut reader, exif_ifd, make.as_deref())?
            }
            _ => (MakerNoteKind::NoVendor, None),
        };

        Ok(Some(Self {
            reader,
            container,
            block,
            ifd0,
            ifd1,
            exif_ifd,
            gps_ifd,
            maker_note,
            maker_note_kind,
        }))
    }

    /// Where the TIFF block was found.
    pub fn container(&self) -> Container {
        self.container
    }

    /// The TIFF block holding the metadata.
    pub fn tiff_block(&self) -> &TiffBlock {
        &self.block
    }

    /// The primary image directory.
    pub fn ifd0(&self) -> &ImageFileDirectory {
        &self.ifd0
    }

    /// The thumbnail directory.
    pub fn ifd1(&self) -> Option<&ImageFileDirectory> {
        self.ifd1.as_ref()
    }

    /// The Exif sub-directory.
    pub fn exif_ifd(&self) -> Option<&ImageFileDirectory> {
        self.exif_ifd.as_ref()
    }

    /// The GPS sub-directory.
    pub fn gps_ifd(&self) -> Option<&ImageFileDirectory> {
        self.gps_ifd.as_ref()
    }

    /// The maker note directory, for the makes whose layout is known.
    pub fn maker_note(&self) -> Option<&ImageFileDirectory> {
        self.maker_note.as_ref()
    }

    /// How the maker note was laid out.
    pub fn maker_note_kind(&self) -> MakerNoteKind {
        self.maker_note_kind
    }

    /// Decode any tag of a resolved directory.
    pub fn value(
        &mut self,
        directory: Directory,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<Value>> {
        let ifd = match directory {
            Directory::Ifd0 => Some(&self.ifd0),
            Directory::Ifd1 => self.ifd1.as_ref(),
            Directory::Exif => self.exif_ifd.as_ref(),
            Directory::Gps => self.gps_ifd.as_ref(),
            Directory::MakerNote => self.maker_note.as_ref(),
        };
        let Some(ifd) = ifd else {
            return Ok(None);
        };
        ifd.value(&mut self.reader, tag)
            .format_as_absent()
            .map(Option::flatten)
    }

    fn string(&mut self, directory: Directory, tag: impl Into<u16>) -> ExifResult<Option<String>> {
        let value = self.value(directory, tag)?;
        Ok(value.as_ref().and_then(Value::as_str).map(str::to_string))
    }

    fn rational(
        &mut self,
        directory: Directory,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<Rational>> {
        let value = self.value(directory, tag)?;
        Ok(value.as_ref().and_then(Value::as_rational))
    }

    /// Camera manufacturer.
    pub fn make(&mut self) -> ExifResult<Option<String>> {
        self.string(Directory::Ifd0, Tag::Make)
    }

    /// Camera model.
    pub fn model(&mut self) -> ExifResult<Option<String>> {
        self.string(Directory::Ifd0, Tag::Model)
    }

    /// Modification date and time, as `YYYY:MM:DD HH:MM:SS`.
    pub fn date_time(&mut self) -> ExifResult<Option<String>> {
        self.string(Directory::Ifd0, Tag::DateTime)
    }

    /// Exposure time: a decimal number of seconds for exposures over a second, `1/x` otherwise.
    pub fn exposure_time(&mut self) -> ExifResult<Option<String>> {
        let Some(exposure) = self.rational(Directory::Exif, Tag::ExposureTime)? else {
            return Ok(None);
        };
        Ok(format_exposure(exposure))
    }

    /// F-number.
    pub fn f_number(&mut self) -> ExifResult<Option<f32>> {
        let f_number = self.rational(Directory::Exif, Tag::FNumber)?;
        Ok(f_number
            .map(|r| r.to_f32())
            .filter(|value| value.is_finite()))
    }

    /// Latitude in decimal degrees, without its hemisphere.
    pub fn gps_latitude(&mut self) -> ExifResult<Option<f64>> {
        let value = self.value(Directory::Gps, GpsTag::GPSLatitude)?;
        Ok(value.as_ref().and_then(dms_to_degrees))
    }

    /// Longitude in decimal degrees, without its hemisphere.
    pub fn gps_longitude(&mut self) -> ExifResult<Option<f64>> {
        let value = self.value(Directory::Gps, GpsTag::GPSLongitude)?;
        Ok(value.as_ref().and_then(dms_to_degrees))
    }

    /// Position with southern latitudes and western longitudes negative.
    pub fn gps_point(&mut self) -> ExifResult<Option<GeodeticPoint>> {
        let (Some(latitude), Some(longitude)) = (self.gps_latitude()?, self.gps_longitude()?)
        else {
            return Ok(None);
        };
        let south = self.string(Directory::Gps, GpsTag::GPSLatitudeRef)?.as_deref() == Some("S");
        let west = self.string(Directory::Gps, GpsTag::GPSLongitudeRef)?.as_deref() == Some("W");
        Ok(Some(GeodeticPoint::new(
            if south { -latitude } else { latitude },
            if west { -longitude } else { longitude },
        )))
    }

    /// Lens description from the maker note.
    ///
    /// Canon stores the lens name; Nikon stores focal lengths and apertures, formatted here as
    /// e.g. `18-55mm f/3.5-5.6`.
    pub fn lens(&mut self) -> ExifResult<Option<String>> {
        match self.maker_note_kind() {
            MakerNoteKind::Canon => self.string(Directory::MakerNote, CanonTag::LensModel),
            kind if kind.is_nikon() => {
                let value = self.value(Directory::MakerNote, NikonTag::Lens)?;
                Ok(value
                    .as_ref()
                    .and_then(Value::to_rationals)
                    .and_then(|lens| format_nikon_lens(&lens)))
            }
            _ => Ok(None),
        }
    }
}

fn read_sub_ifd<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    ifd0: &ImageFileDirectory,
    tag: Tag,
) -> ExifResult<Option<ImageFileDirectory>> {
    match ifd0.value_offset(tag) {
        Some(offset) if offset > 0 => Ok(Some(ifd0.block().read_ifd(reader, offset)?)),
        _ => Ok(None),
    }
}

fn format_exposure(exposure: Rational) -> Option<String> {
    let Rational {
        numerator,
        denominator,
    } = exposure;
    if numerator == 0 || denominator == 0 {
        return None;
    }
    if numerator > denominator {
        Some(format_decimal(exposure.to_f64()))
    } else {
        let reciprocal = (f64::from(denominator) / f64::from(numerator)).round() as u64;
        Some(format!("1/{reciprocal}"))
    }
}

/// Degrees, minutes and seconds to decimal degrees.
fn dms_to_degrees(value: &Value) -> Option<f64> {
    match value.to_rationals()?.as_slice() {
        [degrees, minutes, seconds, ..] => {
            Some(degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0)
        }
        _ => None,
    }
}

fn format_nikon_lens(lens: &[Rational]) -> Option<String> {
    let [min_focal, max_focal, min_aperture, max_aperture] = lens else {
        return None;
    };
    let (min_focal, max_focal) = (min_focal.to_integer()?, max_focal.to_integer()?);
    let (min_aperture, max_aperture) = (min_aperture.to_f32(), max_aperture.to_f32());

    let focal = if min_focal == max_focal {
        min_focal.to_string()
    } else {
        format!("{min_focal}-{max_focal}")
    };
    let aperture = if min_aperture == max_aperture {
        format_decimal(min_aperture.into())
    } else {
        format!(
            "{}-{}",
            format_decimal(min_aperture.into()),
            format_decimal(max_aperture.into())
        )
    };
    Some(format!("{focal}mm f/{aperture}"))
}

/// At most three fraction digits, without trailing zeros.
fn format_decimal(value: f64) -> String {
    let formatted = format!("{value:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
