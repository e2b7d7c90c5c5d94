use super::*;
use crate::foundation::raster::PixelFormat;

fn solid(size: u32, px: [u8; 4]) -> Raster {
    let data = px.repeat((size * size) as usize);
    Raster::from_premul(size, size, data).unwrap()
}

fn rgba8(r: &Raster) -> &image::RgbaImage {
    r.as_rgba8().unwrap()
}

#[test]
fn output_has_exact_target_size() {
    let src = solid(1024, [10, 20, 30, 255]);
    for target in [1, 20, 40, 58, 87, 167, 180, 1024] {
        let out = resample(&src, target).unwrap();
        assert_eq!((out.width(), out.height()), (target, target));
        assert_eq!(rgba8(&out).as_raw().len(), (target * target * 4) as usize);
    }
}

#[test]
fn solid_color_is_preserved_when_down_and_upscaling() {
    let px = [60, 90, 120, 200];
    let src = solid(100, px);
    for target in [1, 7, 33, 100, 150] {
        let out = resample(&src, target).unwrap();
        assert!(rgba8(&out).pixels().all(|p| p.0 == px), "target {target}");
    }
}

#[test]
fn zero_target_is_rejected() {
    let src = solid(4, [0, 0, 0, 255]);
    assert!(matches!(resample(&src, 0), Err(IconsetError::Resample(_))));
    assert!(matches!(resample_to(&src, 4, 0), Err(IconsetError::Resample(_))));
}

#[test]
fn oversized_target_is_an_error_not_an_abort() {
    let src = solid(4, [0, 0, 0, 255]);
    let err = resample(&src, 4_000_000_000).unwrap_err();
    assert!(matches!(err, IconsetError::Resample(_)), "{err}");
    assert!(matches!(
        resample(&src, MAX_EDGE + 1),
        Err(IconsetError::Resample(_))
    ));
}

#[test]
fn same_size_is_identity() {
    let data: Vec<u8> = (0..4 * 4).flat_map(|i| [i as u8, 0, 0, 255]).collect();
    let src = Raster::from_premul(4, 4, data).unwrap();
    assert_eq!(resample(&src, 4).unwrap(), src);
}

#[test]
fn downscaling_averages_fine_detail() {
    // One-pixel stripes: nearest-neighbour would pick pure black or white.
    let mut data = Vec::new();
    for _y in 0..1024u32 {
        for x in 0..1024u32 {
            let v = if x % 2 == 0 { 255 } else { 0 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    let src = Raster::from_premul(1024, 1024, data).unwrap();
    let out = resample(&src, 40).unwrap();
    for p in rgba8(&out).pixels() {
        assert!((115..=140).contains(&p.0[0]), "{p:?}");
        assert_eq!(p.0[3], 255);
    }
}

#[test]
fn premultiplied_invariant_holds() {
    let mut data = Vec::new();
    for y in 0..64u32 {
        for x in 0..64u32 {
            let a = ((x * 4) % 256) as u8;
            let c = ((u32::from(a) * (y % 7)) / 6) as u8;
            data.extend_from_slice(&[c, a / 2, 0, a]);
        }
    }
    let src = Raster::from_premul(64, 64, data).unwrap();
    for target in [5, 23, 40, 97] {
        let out = resample(&src, target).unwrap();
        for p in rgba8(&out).pixels() {
            let [r, g, b, a] = p.0;
            assert!(r <= a && g <= a && b <= a, "{p:?}");
        }
    }
}

#[test]
fn transparent_edges_do_not_bleed_color() {
    // Left half opaque red, right half fully transparent.
    let mut data = Vec::new();
    for _y in 0..8u32 {
        for x in 0..8u32 {
            if x < 4 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    let src = Raster::from_premul(8, 8, data).unwrap();
    let out = resample(&src, 1).unwrap().to_straight();
    let [r, g, b, a] = rgba8(&out).get_pixel(0, 0).0;
    assert_eq!((r, g, b), (255, 0, 0));
    assert!((127..=128).contains(&a), "{a}");
}

#[test]
fn sixteen_bit_depth_is_kept() {
    let data = [0x1234u16, 0x5678, 0x9ABC, 0xFFFF].repeat(64 * 64);
    let src = Raster::from_premul16(64, 64, data).unwrap();
    let out = resample(&src, 20).unwrap();
    assert_eq!(out.format(), PixelFormat::Rgba16Premul);
    let buf = out.as_rgba16().unwrap();
    assert_eq!(buf.dimensions(), (20, 20));
    assert!(buf.pixels().all(|p| p.0 == [0x1234, 0x5678, 0x9ABC, 0xFFFF]));
}

#[test]
fn resampling_is_deterministic() {
    let data: Vec<u8> = (0..97 * 97)
        .flat_map(|i| {
            let a = (i % 256) as u8;
            [a / 3, a / 2, a, a]
        })
        .collect();
    let src = Raster::from_premul(97, 97, data).unwrap();
    assert_eq!(resample(&src, 29).unwrap(), resample(&src, 29).unwrap());
}
