#![allow(clippy::no_effect)]
#![allow(missing_docs)]

use num_enum::{IntoPrimitive, TryFromPrimitive};

macro_rules! tags {
    {
        // Permit arbitrary meta items, which include documentation.
        $( #[$enum_attr:meta] )*
        $vis:vis enum $name:ident($ty:tt) $(unknown($unknown_doc:literal))* {
            // Each of the `Name = Val,` permitting documentation.
            $($(#[$ident_attr:meta])* $tag:ident = $val:expr,)*
        }
    } => {
        $( #[$enum_attr] )*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        #[non_exhaustive]
        pub enum $name {
            $($(#[$ident_attr])* $tag,)*
            $(
                #[doc = $unknown_doc]
                Unknown($ty),
            )*
        }

        impl $name {
            #[inline(always)]
            fn __from_inner_type(n: $ty) -> Result<Self, $ty> {
                match n {
                    $( $val => Ok($name::$tag), )*
                    n => Err(n),
                }
            }

            #[inline(always)]
            fn __to_inner_type(&self) -> $ty {
                match *self {
                    $( $name::$tag => $val, )*
                    $( $name::Unknown(n) => { $unknown_doc; n }, )*
                }
            }

            /// Look up a known tag.
            #[inline(always)]
            pub fn from_u16(val: u16) -> Option<Self> {
                Self::__from_inner_type(val).ok()
            }

            $(
            /// Look up a tag, falling back to `Unknown`.
            #[inline(always)]
            pub fn from_u16_exhaustive(val: u16) -> Self {
                $unknown_doc;
                Self::__from_inner_type(val).unwrap_or_else(|_| $name::Unknown(val))
            }
            )*

            /// The numeric tag as stored in a directory entry.
            #[inline(always)]
            pub fn to_u16(&self) -> u16 {
                Self::__to_inner_type(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match *self {
                    $( $name::$tag => write!(f, stringify!($tag)), )*
                    $( $name::Unknown(n) => { $unknown_doc; write!(f, "{n:#06x}") }, )*
                }
            }
        }

        impl From<$name> for u16 {
            fn from(tag: $name) -> u16 {
                tag.to_u16()
            }
        }

        $(
        impl From<u16> for $name {
            fn from(raw: u16) -> Self {
                $unknown_doc;
                <$name>::from_u16_exhaustive(raw)
            }
        }
        )*
    };
}

tags! {
/// Tags of the primary image directory and the Exif sub-directory.
pub enum Tag(u16) unknown("A private or extension tag") {
    ImageDescription = 0x010e,
    Make = 0x010f,
    Model = 0x0110,
    Orientation = 0x0112,
    Software = 0x0131,
    DateTime = 0x0132,
    Artist = 0x013b,
    Copyright = 0x8298,
    ExposureTime = 0x829a,
    FNumber = 0x829d,
    /// Offset of the Exif sub-directory.
    ExifIfd = 0x8769,
    /// Offset of the GPS sub-directory.
    GpsIfd = 0x8825,
    IsoSpeed = 0x8827,
    DateTimeOriginal = 0x9003,
    FocalLength = 0x920a,
    /// Vendor-specific block, see [`MakerNoteKind`][crate::exif::MakerNoteKind].
    MakerNote = 0x927c,
    LensModel = 0xa434,
}
}

tags! {
/// Tags of the GPS sub-directory.
pub enum GpsTag(u16) unknown("An unrecognised GPS tag") {
    GPSVersionID = 0x0000,
    /// `N` or `S`.
    GPSLatitudeRef = 0x0001,
    /// Degrees, minutes and seconds as three rationals.
    GPSLatitude = 0x0002,
    /// `E` or `W`.
    GPSLongitudeRef = 0x0003,
    /// Degrees, minutes and seconds as three rationals.
    GPSLongitude = 0x0004,
    GPSAltitudeRef = 0x0005,
    GPSAltitude = 0x0006,
    GPSTimeStamp = 0x0007,
    GPSDateStamp = 0x001d,
}
}

tags! {
/// Tags of the Canon maker note directory.
pub enum CanonTag(u16) unknown("An unrecognised Canon maker note tag") {
    ImageType = 0x0006,
    FirmwareVersion = 0x0007,
    OwnerName = 0x0009,
    /// Lens name as an ASCII string.
    LensModel = 0x0095,
}
}

tags! {
/// Tags of the Nikon maker note directory.
pub enum NikonTag(u16) unknown("An unrecognised Nikon maker note tag") {
    MakerNoteVersion = 0x0001,
    Quality = 0x0004,
    SerialNumber = 0x001d,
    /// Min/max focal length and max aperture at both ends as four rationals.
    Lens = 0x0084,
}
}

/// The type of a directory entry's value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
#[allow(clippy::upper_case_acronyms)]
pub enum Type {
    /// 8-bit unsigned integer
    BYTE = 1,
    /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
    ASCII = 2,
    /// 16-bit unsigned integer
    SHORT = 3,
    /// 32-bit unsigned integer
    LONG = 4,
    /// Fraction stored as two 32-bit unsigned integers
    RATIONAL = 5,
    /// 8-bit signed integer
    SBYTE = 6,
    /// 8-bit byte that may contain anything, depending on the field
    UNDEFINED = 7,
    /// 16-bit signed integer
    SSHORT = 8,
    /// 32-bit signed integer
    SLONG = 9,
    /// Fraction stored as two 32-bit signed integers
    SRATIONAL = 10,
    /// 32-bit IEEE floating point
    FLOAT = 11,
    /// 64-bit IEEE floating point
    DOUBLE = 12,
}

impl Type {
    /// Look up a type code. Unknown codes return `None`.
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::try_from_primitive(code).ok()
    }

    /// Size in bytes of one element of this type.
    pub fn size(&self) -> u64 {
        match self {
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => 1,
            Type::SHORT | Type::SSHORT => 2,
            Type::LONG | Type::SLONG | Type::FLOAT => 4,
            Type::RATIONAL | Type::SRATIONAL | Type::DOUBLE => 8,
        }
    }
}
