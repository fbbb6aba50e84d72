use texconform::{
    ImageSource, PixelFormat, PixelType, SourceKind, UploadExecutor, GREEN, RED,
};

mod support;

#[test]
fn reference_raster_is_one_by_two_red_over_green() {
    let raster = ImageSource::reference_raster();

    assert_eq!(raster.kind(), SourceKind::Raster);
    assert_eq!((raster.width(), raster.height()), (1, 2));
    assert_eq!(raster.row(0), [RED[0], RED[1], RED[2], 255]);
    assert_eq!(raster.row(1), [GREEN[0], GREEN[1], GREEN[2], 255]);
}

#[test]
fn fixture_image_is_square_red_over_green() {
    let path = support::fixture_dir().join("red-green.png");
    let image = ImageSource::from_png_file(&path).unwrap();

    assert_eq!(image.kind(), SourceKind::File);
    assert!(image.is_square());
    assert!(image.height() >= 2);

    let top = image.row(0);
    assert_eq!(&top[..3], RED);
    let bottom = image.row(image.height() - 1);
    assert_eq!(&bottom[..3], GREEN);
}

#[test]
fn png_round_trip_preserves_the_raster() {
    let raster = ImageSource::reference_raster();
    let encoded = raster.encode_png().unwrap();
    let decoded = ImageSource::from_png_bytes(SourceKind::PngRoundTrip, &encoded).unwrap();

    assert_eq!(decoded.kind(), SourceKind::PngRoundTrip);
    assert_eq!(
        (decoded.width(), decoded.height()),
        (raster.width(), raster.height())
    );
    assert_eq!(decoded.pixels(), raster.pixels());
}

#[test]
fn background_decode_resolves_exactly_once() {
    let raster = ImageSource::reference_raster();
    let encoded = raster.encode_png().unwrap();

    let receiver = ImageSource::decode_png_in_background(encoded);
    let decoded = receiver.recv().unwrap().unwrap();
    assert_eq!(decoded.pixels(), raster.pixels());

    // the worker sends one message and hangs up
    assert!(receiver.recv().is_err());
}

#[test]
fn background_decode_reports_corrupt_data() {
    let receiver = ImageSource::decode_png_in_background(vec![0xde, 0xad, 0xbe, 0xef]);
    assert!(receiver.recv().unwrap().is_err());
}

#[test]
fn rgba_packing_is_the_identity_on_raster_rows() {
    let executor = UploadExecutor::new(PixelFormat::Rgba, PixelType::UnsignedByte);
    let raster = ImageSource::reference_raster();

    let packed = executor.pack_pixels(&raster, false);
    assert_eq!(packed, raster.pixels());
}

#[test]
fn flip_reverses_row_order_only() {
    let executor = UploadExecutor::new(PixelFormat::Rgba, PixelType::UnsignedByte);
    let raster = ImageSource::reference_raster();

    let packed = executor.pack_pixels(&raster, true);
    assert_eq!(&packed[..4], raster.row(1));
    assert_eq!(&packed[4..], raster.row(0));
}

#[test]
fn rgb_packing_drops_alpha_and_keeps_channel_order() {
    let executor = UploadExecutor::new(PixelFormat::Rgb, PixelType::UnsignedByte);
    let raster = ImageSource::reference_raster();

    let packed = executor.pack_pixels(&raster, false);
    assert_eq!(packed, [RED[0], RED[1], RED[2], GREEN[0], GREEN[1], GREEN[2]]);
}

#[test]
fn packed_565_uses_5_6_5_bit_layout() {
    let executor = UploadExecutor::new(PixelFormat::Rgb, PixelType::UnsignedShort565);
    let raster = ImageSource::reference_raster();

    let packed = executor.pack_pixels(&raster, false);
    assert_eq!(packed.len(), 4);

    let red = u16::from_ne_bytes([packed[0], packed[1]]);
    let green = u16::from_ne_bytes([packed[2], packed[3]]);
    assert_eq!(red, 0b11111_000000_00000);
    assert_eq!(green, 0b00000_111111_00000);
}
