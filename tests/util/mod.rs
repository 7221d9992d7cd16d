//! In-memory builders for TIFF blocks and the containers that carry them.
#![allow(dead_code)]

use bytes::Bytes;
use tiff_exif::Metadata;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn parse(data: Vec<u8>) -> Metadata<std::io::Cursor<Bytes>> {
    init_logger();
    Metadata::from_bytes(data.into())
        .unwrap()
        .expect("metadata should be found")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    Little,
    Big,
}

/// A field of an IFD under construction.
#[derive(Debug, Clone)]
pub(crate) enum Field {
    Ascii(u16, &'static str),
    Short(u16, u16),
    Long(u16, u32),
    Rational(u16, Vec<(u32, u32)>),
    /// A field written as given: tag, type, count and the 4-byte value field.
    Raw(u16, u16, u32, [u8; 4]),
}

/// Writes a TIFF block front to back.
///
/// IFDs are appended with their out-of-line values right after them, so a directory that points
/// at another (sub-IFDs, next IFD, maker notes) is written after the one it points at.
pub(crate) struct TiffWriter {
    order: Order,
    buf: Vec<u8>,
}

impl TiffWriter {
    pub(crate) fn new(order: Order) -> Self {
        let mut writer = Self { order, buf: vec![] };
        let marker = match order {
            Order::Little => *b"II",
            Order::Big => *b"MM",
        };
        writer.buf.extend_from_slice(&marker);
        writer.buf.extend(writer.u16(42));
        writer.buf.extend(writer.u32(0));
        writer
    }

    pub(crate) fn u16(&self, value: u16) -> [u8; 2] {
        match self.order {
            Order::Little => value.to_le_bytes(),
            Order::Big => value.to_be_bytes(),
        }
    }

    pub(crate) fn u32(&self, value: u32) -> [u8; 4] {
        match self.order {
            Order::Little => value.to_le_bytes(),
            Order::Big => value.to_be_bytes(),
        }
    }

    /// Offset the next write lands at.
    pub(crate) fn position(&self) -> u32 {
        self.buf.len() as u32
    }

    /// Append raw bytes, returning their offset.
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.position();
        self.buf.extend_from_slice(bytes);
        offset
    }

    /// Append an IFD and its values, returning the IFD's offset.
    pub(crate) fn write_ifd(&mut self, fields: &[Field], next_ifd: u32) -> u32 {
        let ifd_offset = self.position();
        let mut data_offset = ifd_offset + 2 + 12 * fields.len() as u32 + 4;
        let mut entries = vec![];
        let mut data = vec![];

        for field in fields {
            let (tag, type_code, count, bytes) = match field {
                Field::Ascii(tag, s) => {
                    let mut bytes = s.as_bytes().to_vec();
                    bytes.push(0);
                    (*tag, 2, bytes.len() as u32, bytes)
                }
                Field::Short(tag, v) => (*tag, 3, 1, self.u16(*v).to_vec()),
                Field::Long(tag, v) => (*tag, 4, 1, self.u32(*v).to_vec()),
                Field::Rational(tag, values) => {
                    let bytes = values
                        .iter()
                        .flat_map(|(n, d)| [self.u32(*n), self.u32(*d)].concat())
                        .collect::<Vec<_>>();
                    (*tag, 5, values.len() as u32, bytes)
                }
                Field::Raw(tag, type_code, count, raw) => {
                    entries.extend(self.u16(*tag));
                    entries.extend(self.u16(*type_code));
                    entries.extend(self.u32(*count));
                    entries.extend(raw);
                    continue;
                }
            };
            entries.extend(self.u16(tag));
            entries.extend(self.u16(type_code));
            entries.extend(self.u32(count));
            if bytes.len() <= 4 {
                let mut inline = [0; 4];
                inline[..bytes.len()].copy_from_slice(&bytes);
                entries.extend(inline);
            } else {
                entries.extend(self.u32(data_offset));
                data_offset += bytes.len() as u32;
                data.extend(bytes);
            }
        }

        self.buf.extend(self.u16(fields.len() as u16));
        self.buf.extend(entries);
        self.buf.extend(self.u32(next_ifd));
        self.buf.extend(data);
        ifd_offset
    }

    /// A field whose value field holds `offset`, e.g. a sub-IFD pointer.
    pub(crate) fn pointer(&self, tag: u16, type_code: u16, count: u32, offset: u32) -> Field {
        Field::Raw(tag, type_code, count, self.u32(offset))
    }

    /// Point the header at `first_ifd` and return the block.
    pub(crate) fn finish(mut self, first_ifd: u32) -> Vec<u8> {
        let offset = self.u32(first_ifd);
        self.buf[4..8].copy_from_slice(&offset);
        self.buf
    }
}

/// Wrap a TIFF block in a JPEG stream: SOI, APP0, Exif APP1, SOS.
pub(crate) fn jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut data = vec![0xff, 0xd8];
    data.extend([0xff, 0xe0, 0, 16]);
    data.extend(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
    data.extend([0xff, 0xe1]);
    data.extend((2 + 6 + tiff.len() as u16).to_be_bytes());
    data.extend(b"Exif\0\0");
    data.extend(tiff);
    data.extend([0xff, 0xda, 0, 8, 1, 1, 0, 0, 0x3f, 0]);
    data.extend([0x12, 0x34, 0xff, 0xd9]);
    data
}

pub(crate) fn bmff_box(box_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut data = (8 + payload.len() as u32).to_be_bytes().to_vec();
    data.extend(box_type);
    data.extend(payload);
    data
}

pub(crate) fn full_box(box_type: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
    let mut full = vec![version, 0, 0, 0];
    full.extend(payload);
    bmff_box(box_type, &full)
}

fn infe(item_id: u16, item_type: &[u8; 4], name: &str) -> Vec<u8> {
    let mut payload = item_id.to_be_bytes().to_vec();
    payload.extend([0, 0]);
    payload.extend(item_type);
    payload.extend(name.as_bytes());
    payload.push(0);
    full_box(b"infe", 2, &payload)
}

/// A HEIC file whose Exif item (id 7) starts at `exif_offset`: a 4-byte header offset and
/// `Exif\0\0` precede the TIFF block, which therefore begins at `exif_offset + 10`.
pub(crate) fn heic(tiff: &[u8], exif_offset: u32) -> Vec<u8> {
    let mut ftyp = b"heic".to_vec();
    ftyp.extend([0, 0, 0, 0]);
    ftyp.extend(b"mif1heic");
    let mut data = bmff_box(b"ftyp", &ftyp);

    let mut iinf = 2u16.to_be_bytes().to_vec();
    iinf.extend(infe(1, b"hvc1", "image"));
    iinf.extend(infe(7, b"Exif", ""));

    let exif_len = 10 + tiff.len() as u32;
    let mut iloc = vec![0x44, 0x00, 0, 2];
    // item 1: one extent
    iloc.extend([0, 1, 0, 0, 0, 1]);
    iloc.extend([0, 0, 0x20, 0, 0, 0, 0x10, 0]);
    // item 7: the Exif payload
    iloc.extend([0, 7, 0, 0, 0, 1]);
    iloc.extend(exif_offset.to_be_bytes());
    iloc.extend(exif_len.to_be_bytes());

    let mut meta = full_box(b"hdlr", 0, b"\0\0\0\0pict\0\0\0\0\0\0\0\0\0\0\0\0\0");
    meta.extend(full_box(b"iinf", 0, &iinf));
    meta.extend(full_box(b"iloc", 0, &iloc));
    data.extend(full_box(b"meta", 0, &meta));

    assert!(data.len() <= exif_offset as usize);
    data.resize(exif_offset as usize, 0);
    data.extend([0, 0, 0, 6]);
    data.extend(b"Exif\0\0");
    data.extend(tiff);
    data
}

/// A small IFD0 with the common camera fields and optional sub-IFD pointers.
pub(crate) fn camera_fields(make: &'static str, model: &'static str) -> Vec<Field> {
    vec![
        Field::Ascii(0x010f, make),
        Field::Ascii(0x0110, model),
        Field::Short(0x0112, 1),
        Field::Ascii(0x0132, "2021:06:01 12:34:56"),
    ]
}
