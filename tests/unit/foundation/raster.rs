use super::*;

#[test]
fn from_premul_checks_length_and_keeps_format() {
    assert!(Raster::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_premul(2, 2, vec![0; 17]).is_err());
    let r = Raster::from_premul(3, 2, vec![0; 24]).unwrap();
    assert_eq!((r.width(), r.height()), (3, 2));
    assert_eq!(r.format(), PixelFormat::Rgba8Premul);
    assert!(r.as_rgba16().is_none());
}

#[test]
fn from_premul16_checks_length_and_keeps_format() {
    assert!(Raster::from_premul16(2, 2, vec![0; 8]).is_err());
    let r = Raster::from_premul16(2, 2, vec![0; 16]).unwrap();
    assert_eq!(r.format(), PixelFormat::Rgba16Premul);
    assert!(r.as_rgba8().is_none());
}

#[test]
fn premultiply_rounds_and_zeroes_transparent() {
    let mut px = vec![100u8, 50, 200, 128, 10, 20, 30, 0, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        &px[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..], &[1, 2, 3, 255]);
}

#[test]
fn unpremultiply_inverts_opaque_and_half_alpha() {
    let mut px = vec![50u8, 25, 100, 128, 7, 8, 9, 255, 0, 0, 0, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[100, 50, 199, 128]);
    assert_eq!(&px[4..8], &[7, 8, 9, 255]);
    assert_eq!(&px[8..], &[0, 0, 0, 0]);
}

#[test]
fn sixteen_bit_alpha_round_trips_at_half_alpha() {
    let mut px = vec![0xFFFFu16, 0x8000, 0, 0x8000, 1, 2, 3, 0];
    premultiply_rgba16_in_place(&mut px);
    assert_eq!(&px[..4], &[0x8000, 0x4000, 0, 0x8000]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);

    unpremultiply_rgba16_in_place(&mut px);
    assert_eq!(&px[..4], &[0xFFFF, 0x8000, 0, 0x8000]);
}

#[test]
fn straight_copy_leaves_raster_untouched() {
    let r = Raster::from_premul(1, 1, vec![64, 0, 0, 128]).unwrap();
    let straight = r.to_straight();
    assert_eq!(straight.as_rgba8().unwrap().as_raw(), &vec![128, 0, 0, 128]);
    assert_eq!(r.as_rgba8().unwrap().as_raw(), &vec![64, 0, 0, 128]);
}
