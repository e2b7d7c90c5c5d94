use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::encode::png::encode_png;
use crate::foundation::error::{IconsetError, IconsetResult};
use crate::foundation::raster::Raster;
use crate::manifest::model::{IconManifest, ManifestEntry};
use crate::output::materialize::{APPICONSET_DIR, EncodedImage, materialize_encoded};
use crate::render::resample::resample;
use crate::source::load::MasterImage;

/// Worker configuration for per-entry work (resample + encode).
#[derive(Clone, Debug, Default)]
pub struct RenderThreading {
    /// Run entries on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Override rayon worker threads (parallel mode only). Must be >= 1 when set.
    pub threads: Option<usize>,
}

/// Options for [`generate_appiconset`].
#[derive(Clone, Debug)]
pub struct GenerateOpts {
    /// Directory in which `AppIcon.appiconset` is (re)created.
    pub out_dir: PathBuf,
    /// Manifest describing the required outputs.
    pub manifest: IconManifest,
    /// Per-entry threading.
    pub threading: RenderThreading,
}

impl GenerateOpts {
    /// Options using the built-in manifest, writing under `out_dir`, sequential.
    pub fn with_builtin_manifest(out_dir: impl Into<PathBuf>) -> IconsetResult<Self> {
        Ok(Self {
            out_dir: out_dir.into(),
            manifest: IconManifest::builtin()?,
            threading: RenderThreading::default(),
        })
    }

    /// Full path of the output set.
    pub fn appiconset_dir(&self) -> PathBuf {
        self.out_dir.join(APPICONSET_DIR)
    }
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
    /// The output set directory.
    pub dir: PathBuf,
    /// Number of image files written.
    pub images_written: usize,
    /// Edge length of the master image.
    pub master_size: u32,
}

/// Read the master image at `path` and run [`generate_appiconset_from_master`].
pub fn generate_appiconset_from_path(
    path: impl AsRef<Path>,
    opts: &GenerateOpts,
) -> IconsetResult<GenerateReport> {
    let master = MasterImage::load_path(path)?;
    generate_appiconset_from_master(&master, opts)
}

/// Decode `master_bytes` and run [`generate_appiconset_from_master`].
pub fn generate_appiconset(
    master_bytes: &[u8],
    opts: &GenerateOpts,
) -> IconsetResult<GenerateReport> {
    let master = MasterImage::load(master_bytes)?;
    generate_appiconset_from_master(&master, opts)
}

/// Derive every manifest entry from a validated master and replace the output set.
///
/// All pixel work and encoding happen before the output directory is touched.
#[tracing::instrument(skip(master, opts), fields(out = %opts.out_dir.display()))]
pub fn generate_appiconset_from_master(
    master: &MasterImage,
    opts: &GenerateOpts,
) -> IconsetResult<GenerateReport> {
    let plan = plan_entries(&opts.manifest)?;
    tracing::info!(entries = plan.len(), "rendering icons");

    let encoded = run_entries(&plan, &opts.threading, |entry, px| {
        let raster = render_entry(master, entry, px)?;
        Ok(EncodedImage {
            filename: entry.filename.clone(),
            png: encode_png(&entry.filename, &raster)?,
        })
    })?;

    let report = materialize_encoded(&opts.appiconset_dir(), &opts.manifest, &encoded)?;
    Ok(GenerateReport {
        dir: report.dir,
        images_written: report.images.len(),
        master_size: master.size(),
    })
}

/// Resample the master once per manifest entry, keyed by filename.
pub fn render_all(
    master: &MasterImage,
    manifest: &IconManifest,
    threading: &RenderThreading,
) -> IconsetResult<BTreeMap<String, Raster>> {
    let plan = plan_entries(manifest)?;
    let rendered = run_entries(&plan, threading, |entry, px| {
        Ok((entry.filename.clone(), render_entry(master, entry, px)?))
    })?;
    Ok(rendered.into_iter().collect())
}

fn plan_entries(manifest: &IconManifest) -> IconsetResult<Vec<(&ManifestEntry, u32)>> {
    manifest
        .entries()
        .iter()
        .map(|e| Ok((e, e.target_pixel_size()?)))
        .collect()
}

fn render_entry(master: &MasterImage, entry: &ManifestEntry, px: u32) -> IconsetResult<Raster> {
    if px > master.size() {
        tracing::warn!(
            filename = %entry.filename,
            px,
            master = master.size(),
            "target is larger than the master; upscaling"
        );
    }
    let _span = tracing::debug_span!("render_entry", filename = %entry.filename, px).entered();
    resample(master.raster(), px)
}

/// Run `f` for every planned entry, in manifest order, on the calling thread or a rayon pool.
fn run_entries<'m, T, F>(
    plan: &[(&'m ManifestEntry, u32)],
    threading: &RenderThreading,
    f: F,
) -> IconsetResult<Vec<T>>
where
    T: Send,
    F: Fn(&'m ManifestEntry, u32) -> IconsetResult<T> + Sync,
{
    if !threading.parallel {
        return plan.iter().map(|&(e, px)| f(e, px)).collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    pool.install(|| plan.par_iter().map(|&(e, px)| f(e, px)).collect())
}

fn build_thread_pool(threads: Option<usize>) -> IconsetResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(IconsetError::resample(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| IconsetError::resample(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
