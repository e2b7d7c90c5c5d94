use std::fs;
use std::io::Cursor;

use tempfile::tempdir;

use super::*;
use crate::output::materialize::CONTENTS_FILE;
use crate::source::load::MASTER_SIZE;

fn master_png(size: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(size, size, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn render_all_matches_manifest_sizes() {
    let master = MasterImage::load(&master_png(MASTER_SIZE)).unwrap();
    let manifest = IconManifest::builtin().unwrap();
    let rendered = render_all(&master, &manifest, &RenderThreading::default()).unwrap();

    assert_eq!(rendered.len(), manifest.len());
    for entry in manifest.entries() {
        let px = entry.target_pixel_size().unwrap();
        let r = &rendered[&entry.filename];
        assert_eq!((r.width(), r.height()), (px, px), "{}", entry.filename);
    }
}

#[test]
fn parallel_and_sequential_render_agree() {
    let master = MasterImage::load(&master_png(MASTER_SIZE)).unwrap();
    let manifest = IconManifest::builtin().unwrap();
    let seq = render_all(&master, &manifest, &RenderThreading::default()).unwrap();
    let par = render_all(
        &master,
        &manifest,
        &RenderThreading {
            parallel: true,
            threads: Some(3),
        },
    )
    .unwrap();
    assert_eq!(seq, par);
}

#[test]
fn zero_threads_is_rejected() {
    let master = MasterImage::load(&master_png(MASTER_SIZE)).unwrap();
    let manifest = IconManifest::builtin().unwrap();
    let err = render_all(
        &master,
        &manifest,
        &RenderThreading {
            parallel: true,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, IconsetError::Resample(_)));
}

#[test]
fn generate_writes_full_set() {
    let root = tempdir().unwrap();
    let opts = GenerateOpts::with_builtin_manifest(root.path()).unwrap();
    let report = generate_appiconset(&master_png(MASTER_SIZE), &opts).unwrap();

    assert_eq!(report.images_written, 18);
    assert_eq!(report.master_size, MASTER_SIZE);
    assert_eq!(report.dir, root.path().join(APPICONSET_DIR));
    assert!(report.dir.join(CONTENTS_FILE).is_file());
}

#[test]
fn wrong_master_size_leaves_existing_output_alone() {
    let root = tempdir().unwrap();
    let opts = GenerateOpts::with_builtin_manifest(root.path()).unwrap();
    let dir = opts.appiconset_dir();
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("sentinel"), b"x").unwrap();

    let err = generate_appiconset(&master_png(512), &opts).unwrap_err();
    assert!(matches!(err, IconsetError::DimensionMismatch { .. }));
    assert_eq!(fs::read(dir.join("sentinel")).unwrap(), b"x");
}

#[test]
fn from_path_reports_unreadable_source() {
    let root = tempdir().unwrap();
    let opts = GenerateOpts::with_builtin_manifest(root.path()).unwrap();
    let err = generate_appiconset_from_path(root.path().join("missing.png"), &opts).unwrap_err();
    assert!(matches!(err, IconsetError::UnreadableSource { .. }));
    assert!(!opts.appiconset_dir().exists());
}
