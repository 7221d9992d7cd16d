use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use bytes::Bytes;

use crate::error::ExifResult;
use crate::metadata::TiffBlock;
use crate::reader::{BinaryReader, Endianness};
use crate::tiff::tags::Type;
use crate::tiff::{Rational, SRational, TiffFormatError, Value};

/// One tagged field of an [`ImageFileDirectory`].
///
/// The 4-byte value field holds the value itself when it fits (`type size × count ≤ 4`) and
/// otherwise an offset, relative to the TIFF block, where the value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    tag: u16,
    type_code: u16,
    count: u32,
    value_offset: [u8; 4],
}

impl DirectoryEntry {
    /// Create an entry from its raw fields.
    pub fn new(tag: u16, type_code: u16, count: u32, value_offset: [u8; 4]) -> Self {
        Self {
            tag,
            type_code,
            count,
            value_offset,
        }
    }

    /// The tag number.
    pub fn tag(&self) -> u16 {
        self.tag
    }

    /// The type code as stored in the file, which may be outside the known range.
    pub fn type_code(&self) -> u16 {
        self.type_code
    }

    /// The field type, or `None` for an unrecognised type code.
    pub fn field_type(&self) -> Option<Type> {
        Type::from_u16(self.type_code)
    }

    /// Number of elements.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The raw 4-byte value field.
    pub fn raw_value(&self) -> [u8; 4] {
        self.value_offset
    }

    /// Size in bytes of one element. `None` for an unrecognised type code.
    pub fn type_length(&self) -> Option<u64> {
        self.field_type().map(|t| t.size())
    }

    /// Size in bytes of the whole value. `None` for an unrecognised type or an empty value.
    pub fn byte_length(&self) -> Option<u64> {
        let length = self.type_length()? * u64::from(self.count);
        (length > 0).then_some(length)
    }

    /// Returns `true` if the value is stored in the entry itself rather than at an offset.
    pub fn is_inline(&self) -> bool {
        self.byte_length().is_some_and(|length| length <= 4)
    }

    /// The value field read as an unsigned offset in the given byte order.
    pub fn value_offset(&self, endianness: Endianness) -> u32 {
        match endianness {
            Endianness::LittleEndian => u32::from_le_bytes(self.value_offset),
            Endianness::BigEndian => u32::from_be_bytes(self.value_offset),
        }
    }

    /// Decode an inline value straight from the entry, without touching the byte source.
    ///
    /// Returns `None` if the value does not fit in the entry or has no bytes.
    pub fn inline_value(&self, endianness: Endianness) -> ExifResult<Option<Value>> {
        let (Some(field_type), Some(length)) = (self.field_type(), self.byte_length()) else {
            return Ok(None);
        };
        if length > 4 {
            return Ok(None);
        }
        let data = Bytes::copy_from_slice(&self.value_offset[..length as usize]);
        decode_elements(data, endianness, field_type, self.count).map(Some)
    }

    /// Resolve the value, following the offset into `block` when it does not fit in the entry.
    ///
    /// Returns `None` for unrecognised types and empty values.
    pub fn resolve<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        block: &TiffBlock,
    ) -> ExifResult<Option<Value>> {
        let (Some(field_type), Some(length)) = (self.field_type(), self.byte_length()) else {
            return Ok(None);
        };
        if length <= 4 {
            return self.inline_value(block.endianness());
        }
        if length > block.value_limit() {
            return Err(TiffFormatError::ValueTooLarge {
                tag: self.tag,
                length,
            }
            .into());
        }

        let offset = self.value_offset(block.endianness());
        reader.seek(block.offset() + u64::from(offset))?;
        let data = reader.read_bytes(length)?;
        decode_elements(data, block.endianness(), field_type, self.count).map(Some)
    }
}

/// Decode `count` elements of `field_type` from `data`.
fn decode_elements(
    data: Bytes,
    endianness: Endianness,
    field_type: Type,
    count: u32,
) -> ExifResult<Value> {
    if field_type == Type::ASCII {
        return Ok(decode_ascii(&data));
    }

    let mut cursor = BinaryReader::new(Cursor::new(data));
    cursor.set_endianness(endianness);

    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let value = match field_type {
            Type::BYTE | Type::UNDEFINED => Value::Byte(cursor.read_u8()?),
            Type::SBYTE => Value::SignedByte(cursor.read_i8()?),
            Type::SHORT => Value::Short(cursor.read_u16()?),
            Type::SSHORT => Value::SignedShort(cursor.read_i16()?),
            Type::LONG => Value::Unsigned(cursor.read_u32()?),
            Type::SLONG => Value::Signed(cursor.read_i32()?),
            Type::FLOAT => Value::Float(cursor.read_f32()?),
            Type::DOUBLE => Value::Double(cursor.read_f64()?),
            Type::RATIONAL => {
                Value::Rational(Rational::new(cursor.read_u32()?, cursor.read_u32()?))
            }
            Type::SRATIONAL => {
                Value::SRational(SRational::new(cursor.read_i32()?, cursor.read_i32()?))
            }
            Type::ASCII => unreachable!(),
        };
        values.push(value);
    }

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(Value::List(values))
    }
}

/// Split ASCII data into its NUL-terminated strings.
///
/// `count` bounds the bytes, not the strings, so one entry can hold zero or more strings. Bytes
/// after the last terminator still form a string when there are any.
fn decode_ascii(data: &[u8]) -> Value {
    let mut segments: Vec<&[u8]> = data.split(|b| *b == 0).collect();
    if segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    let mut strings: Vec<Value> = segments
        .into_iter()
        .map(|s| Value::Ascii(String::from_utf8_lossy(s).into_owned()))
        .collect();

    if strings.len() == 1 {
        strings.remove(0)
    } else {
        Value::List(strings)
    }
}

/// An Image File Directory: the entries of one directory, keyed by tag, plus the link to the next
/// directory in the chain.
///
/// A directory keeps the [`TiffBlock`] it was read from, so offsets inside it are resolved against
/// the right base and byte order even when several TIFF blocks are nested in one file.
#[derive(Debug, Clone)]
pub struct ImageFileDirectory {
    block: TiffBlock,
    offset: u32,
    entry_count: u16,
    entries: HashMap<u16, DirectoryEntry>,
    next_ifd_offset: Option<u32>,
}

impl ImageFileDirectory {
    /// Read and parse the IFD starting at `offset`, relative to the start of `block`.
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut BinaryReader<R>,
        block: &TiffBlock,
        offset: u32,
    ) -> ExifResult<Self> {
        reader.set_endianness(block.endianness());
        reader.seek(block.offset() + u64::from(offset))?;

        let entry_count = reader.read_u16()?;
        let mut entries = HashMap::with_capacity(entry_count as usize);
        // Tag   2 bytes
        // Type  2 bytes
        // Count 4 bytes
        // Value 4 bytes, either the value itself or an offset to it
        for _ in 0..entry_count {
            let tag = reader.read_u16()?;
            let type_code = reader.read_u16()?;
            let count = reader.read_i32()?;
            let value_offset = reader.read_array::<4>()?;
            let Ok(count) = u32::try_from(count) else {
                log::debug!("dropping entry {tag:#06x} with negative count {count}");
                continue;
            };
            entries.insert(tag, DirectoryEntry::new(tag, type_code, count, value_offset));
        }

        // If the offset is 0, this is the last IFD
        let next_ifd_offset = match reader.read_u32()? {
            0 => None,
            next => Some(next),
        };

        Ok(Self {
            block: *block,
            offset,
            entry_count,
            entries,
            next_ifd_offset,
        })
    }

    /// The TIFF block this directory belongs to.
    pub fn block(&self) -> &TiffBlock {
        &self.block
    }

    /// Offset of this directory, relative to its block.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of entries declared in the directory header, including dropped ones.
    pub fn entry_count(&self) -> u16 {
        self.entry_count
    }

    /// All retained entries.
    pub fn entries(&self) -> &HashMap<u16, DirectoryEntry> {
        &self.entries
    }

    /// Offset of the next directory in the chain, relative to the block.
    pub fn next_ifd_offset(&self) -> Option<u32> {
        self.next_ifd_offset
    }

    /// Look up an entry.
    pub fn entry(&self, tag: impl Into<u16>) -> Option<&DirectoryEntry> {
        self.entries.get(&tag.into())
    }

    /// The raw value field of an entry read as an offset, e.g. for sub-directory pointers.
    pub fn value_offset(&self, tag: impl Into<u16>) -> Option<u32> {
        self.entry(tag)
            .map(|entry| entry.value_offset(self.block.endianness()))
    }

    /// Resolve the value of an entry. `None` if the tag is absent or its value is empty.
    pub fn value<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<Value>> {
        match self.entry(tag) {
            Some(entry) => entry.resolve(reader, &self.block),
            None => Ok(None),
        }
    }

    /// The first string of an ASCII entry.
    pub fn string<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<String>> {
        let value = self.value(reader, tag)?;
        Ok(value.as_ref().and_then(Value::as_str).map(str::to_string))
    }

    /// The first fraction of a `RATIONAL` entry.
    pub fn rational<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<Rational>> {
        let value = self.value(reader, tag)?;
        Ok(value.as_ref().and_then(Value::as_rational))
    }

    /// The first element of an integer entry.
    pub fn integer<R: Read + Seek>(
        &self,
        reader: &mut BinaryReader<R>,
        tag: impl Into<u16>,
    ) -> ExifResult<Option<i64>> {
        let value = self.value(reader, tag)?;
        Ok(value.as_ref().and_then(Value::as_i64))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tiff::tags::Tag;

    fn block(endianness: Endianness) -> TiffBlock {
        TiffBlock::new(0, endianness, 8)
    }

    /// A reader with no bytes: any read or seek that reaches the source fails.
    fn empty_reader() -> BinaryReader<Cursor<Vec<u8>>> {
        BinaryReader::new(Cursor::new(vec![]))
    }

    #[test]
    #[rustfmt::skip]
    fn test_inline_values_never_read_the_source() {
        let cases = [
        //  type count  value field     byte order
            (1,  1,     [42, 0, 0, 0],  Endianness::LittleEndian, Value::Byte(42)),
            (7,  4,     [1, 2, 3, 4],   Endianness::BigEndian,    Value::List(vec![Value::Byte(1), Value::Byte(2), Value::Byte(3), Value::Byte(4)])),
            (6,  1,     [0xff, 0, 0, 0],Endianness::BigEndian,    Value::SignedByte(-1)),
            (3,  1,     [42, 0, 0, 0],  Endianness::LittleEndian, Value::Short(42)),
            (3,  1,     [0, 42, 0, 0],  Endianness::BigEndian,    Value::Short(42)),
            (3,  2,     [0, 1, 0, 2],   Endianness::BigEndian,    Value::List(vec![Value::Short(1), Value::Short(2)])),
            (8,  1,     [0xff, 0xfe, 0, 0], Endianness::BigEndian, Value::SignedShort(-2)),
            (4,  1,     [42, 0, 0, 0],  Endianness::LittleEndian, Value::Unsigned(42)),
            (4,  1,     [0, 0, 0, 42],  Endianness::BigEndian,    Value::Unsigned(42)),
            (9,  1,     [0xff, 0xff, 0xff, 0xff], Endianness::LittleEndian, Value::Signed(-1)),
            (11, 1,     [0, 0, 0, 42],  Endianness::BigEndian,    Value::Float(f32::from_bits(42))),
            (2,  4,     [b'A', b'B', b'C', 0], Endianness::BigEndian, Value::Ascii("ABC".into())),
            (2,  1,     [0, 0, 0, 0],   Endianness::LittleEndian, Value::Ascii("".into())),
            (2,  4,     [b'a', 0, b'b', 0], Endianness::LittleEndian, Value::List(vec![Value::Ascii("a".into()), Value::Ascii("b".into())])),
        ];
        for (type_code, count, raw, endianness, expected) in cases {
            let entry = DirectoryEntry::new(0x0101, type_code, count, raw);
            assert!(entry.is_inline());
            let mut reader = empty_reader();
            assert_eq!(
                entry.resolve(&mut reader, &block(endianness)).unwrap(),
                Some(expected)
            );
            assert_eq!(reader.position().unwrap(), 0);
        }
    }

    #[test]
    #[rustfmt::skip]
    fn test_values_behind_offsets() {
        let cases = [
            // value field points at byte 12 (relative to a block starting at 4)
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 42,42,42,42,42],            1,  5, Value::List(vec![Value::Byte(42); 5])),
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,42, 0,42, 0,42],          3,  3, Value::List(vec![Value::Short(42); 3])),
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,1, 0,0,0,250],        5,  1, Value::Rational(Rational::new(1, 250))),
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0xff,0xff,0xff,0xfd, 0,0,0,3], 10, 1, Value::SRational(SRational::new(-3, 3))),
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0,0,0,0,42],          12, 1, Value::Double(f64::from_bits(42))),
            (vec![0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, b'N',b'I',b'K',b'O',b'N',0], 2,  6, Value::Ascii("NIKON".into())),
        ];
        let block = TiffBlock::new(4, Endianness::BigEndian, 8);
        for (data, type_code, count, expected) in cases {
            let entry = DirectoryEntry::new(0x0101, type_code, count, [0, 0, 0, 12]);
            assert!(!entry.is_inline());
            let mut reader = BinaryReader::new(Cursor::new(data));
            assert_eq!(entry.resolve(&mut reader, &block).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_empty_and_unknown_types_have_no_value() {
        let mut reader = empty_reader();
        let unknown = DirectoryEntry::new(0x0101, 99, 4, [1, 2, 3, 4]);
        assert_eq!(unknown.type_length(), None);
        assert_eq!(unknown.resolve(&mut reader, &block(Endianness::BigEndian)).unwrap(), None);

        let empty = DirectoryEntry::new(0x0101, 3, 0, [1, 2, 3, 4]);
        assert_eq!(empty.byte_length(), None);
        assert_eq!(empty.resolve(&mut reader, &block(Endianness::BigEndian)).unwrap(), None);
    }

    #[test]
    fn test_value_limit() {
        let entry = DirectoryEntry::new(0x0101, 7, 1024, [0, 0, 0, 8]);
        let block = TiffBlock::new(0, Endianness::BigEndian, 8).with_value_limit(512);
        let err = entry
            .resolve(&mut BinaryReader::new(Cursor::new(vec![0; 2048])), &block)
            .unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    #[rustfmt::skip]
    fn test_read_ifd_drops_negative_counts() {
        let data = vec![
            // entry count
            0, 3,
            // Make, ASCII, count 4, "abc\0"
            0x01, 0x0f, 0, 2, 0, 0, 0, 4, b'a', b'b', b'c', 0,
            // negative count
            0x01, 0x10, 0, 2, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0,
            // duplicate Make, last one wins
            0x01, 0x0f, 0, 2, 0, 0, 0, 4, b'x', b'y', b'z', 0,
            // next IFD
            0, 0, 0, 0,
        ];
        let mut reader = BinaryReader::new(Cursor::new(data));
        let ifd = ImageFileDirectory::read(&mut reader, &block(Endianness::BigEndian), 0).unwrap();
        assert_eq!(ifd.entry_count(), 3);
        assert_eq!(ifd.entries().len(), 1);
        assert!(ifd.entry(Tag::Model).is_none());
        assert_eq!(ifd.next_ifd_offset(), None);
        assert_eq!(ifd.string(&mut reader, Tag::Make).unwrap(), Some("xyz".to_string()));
        assert_eq!(ifd.rational(&mut reader, Tag::Make).unwrap(), None);
        assert_eq!(ifd.string(&mut reader, Tag::Model).unwrap(), None);
    }
}
