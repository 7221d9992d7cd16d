mod util;

use std::io::Cursor;

use tiff_exif::reader::Endianness;
use tiff_exif::tiff::tags::{GpsTag, Tag};
use tiff_exif::tiff::Value;
use tiff_exif::{Container, Directory, MakerNoteKind, Metadata, ParseOptions};
use util::{camera_fields, heic, jpeg, parse, Field, Order, TiffWriter};

/// A block with IFD0, IFD1, an Exif and a GPS sub-IFD.
fn sample_tiff(order: Order) -> Vec<u8> {
    let mut writer = TiffWriter::new(order);
    let exif = writer.write_ifd(
        &[
            Field::Rational(0x829a, vec![(1, 250)]),
            Field::Rational(0x829d, vec![(28, 10)]),
            Field::Short(0x8827, 400),
        ],
        0,
    );
    let gps = writer.write_ifd(
        &[
            Field::Ascii(0x0001, "N"),
            Field::Rational(0x0002, vec![(1, 1), (30, 1), (0, 1)]),
            Field::Ascii(0x0003, "W"),
            Field::Rational(0x0004, vec![(0, 1), (0, 1), (3600, 1)]),
        ],
        0,
    );
    let ifd1 = writer.write_ifd(&[Field::Short(0x0103, 6)], 0);

    let mut fields = camera_fields("Apple", "iPhone 12");
    fields.push(writer.pointer(0x8769, 4, 1, exif));
    fields.push(writer.pointer(0x8825, 4, 1, gps));
    let ifd0 = writer.write_ifd(&fields, ifd1);
    writer.finish(ifd0)
}

fn assert_sample(metadata: &mut Metadata<Cursor<bytes::Bytes>>) {
    assert_eq!(metadata.make().unwrap().as_deref(), Some("Apple"));
    assert_eq!(metadata.model().unwrap().as_deref(), Some("iPhone 12"));
    assert_eq!(
        metadata.date_time().unwrap().as_deref(),
        Some("2021:06:01 12:34:56")
    );
    assert_eq!(metadata.exposure_time().unwrap().as_deref(), Some("1/250"));
    assert_eq!(metadata.f_number().unwrap(), Some(2.8));
    assert_eq!(metadata.gps_latitude().unwrap(), Some(1.5));
    assert_eq!(metadata.gps_longitude().unwrap(), Some(1.0));

    let point = metadata.gps_point().unwrap().unwrap();
    assert_eq!((point.latitude(), point.longitude()), (1.5, -1.0));

    assert!(metadata.ifd1().is_some());
    assert_eq!(metadata.maker_note_kind(), MakerNoteKind::NoVendor);
    assert_eq!(metadata.lens().unwrap(), None);
    assert_eq!(
        metadata.value(Directory::Exif, Tag::IsoSpeed).unwrap(),
        Some(Value::Short(400))
    );
}

#[test]
fn test_jpeg() {
    for (order, endianness) in [
        (Order::Little, Endianness::LittleEndian),
        (Order::Big, Endianness::BigEndian),
    ] {
        let mut metadata = parse(jpeg(&sample_tiff(order)));
        assert_eq!(metadata.container(), Container::Jpeg);
        // SOI, APP0, APP1 header and the Exif marker
        assert_eq!(metadata.tiff_block().offset(), 30);
        assert_eq!(metadata.tiff_block().endianness(), endianness);
        assert_sample(&mut metadata);
    }
}

#[test]
fn test_heic() {
    let mut metadata = parse(heic(&sample_tiff(Order::Big), 1000));
    assert_eq!(metadata.container(), Container::Heic);
    assert_eq!(metadata.tiff_block().offset(), 1010);
    assert_sample(&mut metadata);
}

#[test]
fn test_raw_tiff() {
    let mut metadata = parse(sample_tiff(Order::Little));
    assert_eq!(metadata.container(), Container::RawTiff);
    assert_eq!(metadata.tiff_block().offset(), 0);
    assert_sample(&mut metadata);
}

#[test]
fn test_no_metadata() {
    util::init_logger();
    let cases: [&[u8]; 3] = [
        b"hello world, no metadata here",
        // JPEG without Exif
        &[0xff, 0xd8, 0xff, 0xda, 0, 2, 0, 0, 0, 0, 0, 0],
        // TIFF marker with the wrong magic
        b"II\x2b\0\x08\0\0\0\0\0\0\0",
    ];
    for data in cases {
        let metadata = Metadata::from_bytes(bytes::Bytes::from_static(data)).unwrap();
        assert!(metadata.is_none());
    }
}

#[test]
fn test_absent_sub_ifds() {
    let mut writer = TiffWriter::new(Order::Big);
    let ifd0 = writer.write_ifd(&camera_fields("Canon", "EOS R5"), 0);
    let mut metadata = parse(writer.finish(ifd0));

    assert_eq!(metadata.make().unwrap().as_deref(), Some("Canon"));
    assert!(metadata.ifd1().is_none());
    assert!(metadata.exif_ifd().is_none());
    assert!(metadata.gps_ifd().is_none());
    assert_eq!(metadata.exposure_time().unwrap(), None);
    assert_eq!(metadata.f_number().unwrap(), None);
    assert_eq!(metadata.lens().unwrap(), None);
    assert_eq!(metadata.gps_latitude().unwrap(), None);
    assert_eq!(metadata.gps_point().unwrap(), None);
    assert_eq!(
        metadata.value(Directory::Gps, GpsTag::GPSLatitude).unwrap(),
        None
    );
}

#[test]
fn test_value_limit() {
    let options = ParseOptions {
        max_value_length: 4,
        ..Default::default()
    };
    let data = sample_tiff(Order::Big);
    let mut metadata = Metadata::parse_with_options(Cursor::new(data), options)
        .unwrap()
        .unwrap();

    // Strings longer than the limit are absent, inline values are not
    assert_eq!(metadata.make().unwrap(), None);
    assert_eq!(
        metadata.value(Directory::Ifd0, Tag::Orientation).unwrap(),
        Some(Value::Short(1))
    );
    assert_eq!(metadata.exposure_time().unwrap(), None);
}

#[test]
fn test_sub_ifd_past_end_is_an_error() {
    util::init_logger();
    let mut writer = TiffWriter::new(Order::Big);
    let mut fields = camera_fields("Apple", "iPhone 12");
    fields.push(writer.pointer(0x8769, 4, 1, 0xffff));
    let ifd0 = writer.write_ifd(&fields, 0);
    let data = writer.finish(ifd0);

    let err = Metadata::from_bytes(data.into()).unwrap_err();
    assert!(err.is_end_of_file());
}
