use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::encode::png::encode_png;
use crate::foundation::error::{IconsetError, IconsetResult, WriteOp};
use crate::foundation::raster::Raster;
use crate::manifest::model::IconManifest;

/// Directory name of the output set.
pub const APPICONSET_DIR: &str = "AppIcon.appiconset";
/// File name of the manifest document inside the output set.
pub const CONTENTS_FILE: &str = "contents.json";

/// One manifest entry encoded and ready to write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Manifest filename.
    pub filename: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// What a successful materialization produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Final output directory.
    pub dir: PathBuf,
    /// Image files written, in manifest order.
    pub images: Vec<PathBuf>,
}

/// Encode every manifest entry's raster, in manifest order.
///
/// Fails if an entry has no rendered raster.
pub fn encode_all(
    manifest: &IconManifest,
    rendered: &BTreeMap<String, Raster>,
) -> IconsetResult<Vec<EncodedImage>> {
    manifest
        .entries()
        .iter()
        .map(|entry| {
            let raster = rendered
                .get(&entry.filename)
                .ok_or_else(|| IconsetError::encode(&entry.filename, "no rendered raster"))?;
            Ok(EncodedImage {
                filename: entry.filename.clone(),
                png: encode_png(&entry.filename, raster)?,
            })
        })
        .collect()
}

/// Replace `base_dir` with the manifest document plus one PNG per entry.
pub fn materialize(
    base_dir: &Path,
    manifest: &IconManifest,
    rendered: &BTreeMap<String, Raster>,
) -> IconsetResult<MaterializeReport> {
    let encoded = encode_all(manifest, rendered)?;
    materialize_encoded(base_dir, manifest, &encoded)
}

/// Replace `base_dir` with the manifest document plus the already encoded images.
///
/// Full-replace semantics: whatever was at `base_dir` is gone afterwards. Files are first written
/// into a hidden staging directory next to `base_dir`, which is renamed into place only once every
/// write succeeded. A failure before the swap leaves any previous output untouched.
#[tracing::instrument(skip(manifest, encoded), fields(dir = %base_dir.display(), images = encoded.len()))]
pub fn materialize_encoded(
    base_dir: &Path,
    manifest: &IconManifest,
    encoded: &[EncodedImage],
) -> IconsetResult<MaterializeReport> {
    let ordered = manifest
        .entries()
        .iter()
        .map(|entry| {
            encoded
                .iter()
                .find(|e| e.filename == entry.filename)
                .ok_or_else(|| IconsetError::encode(&entry.filename, "no encoded image"))
        })
        .collect::<IconsetResult<Vec<_>>>()?;

    let name = base_dir
        .file_name()
        .ok_or_else(|| {
            IconsetError::write(
                WriteOp::CreateDir,
                base_dir,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no directory name"),
            )
        })?
        .to_owned();
    let parent = match base_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| IconsetError::write(WriteOp::CreateDir, &parent, e))?;

    let prefix = hidden_prefix(&name, "staging");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        // Temp dirs default to 0700; the output set gets the umask-derived mode of a plain mkdir.
        builder.permissions(fs::Permissions::from_mode(0o777));
    }
    let stage = builder
        .tempdir_in(&parent)
        .map_err(|e| IconsetError::write(WriteOp::CreateDir, &parent, e))?;
    tracing::debug!(stage = %stage.path().display(), "created staging directory");

    let contents = stage.path().join(CONTENTS_FILE);
    fs::write(&contents, manifest.document())
        .map_err(|e| IconsetError::write(WriteOp::WriteManifest, base_dir.join(CONTENTS_FILE), e))?;

    let mut images = Vec::with_capacity(ordered.len());
    for img in ordered {
        fs::write(stage.path().join(&img.filename), &img.png)
            .map_err(|e| IconsetError::write(WriteOp::WriteImage, base_dir.join(&img.filename), e))?;
        tracing::debug!(filename = %img.filename, bytes = img.png.len(), "wrote image");
        images.push(base_dir.join(&img.filename));
    }

    swap_into_place(stage, &parent, &name, base_dir)?;
    tracing::info!(dir = %base_dir.display(), images = images.len(), "output set written");
    Ok(MaterializeReport {
        dir: base_dir.to_path_buf(),
        images,
    })
}

fn hidden_prefix(name: &OsStr, tag: &str) -> OsString {
    let mut p = OsString::from(".");
    p.push(name);
    p.push(format!(".{tag}-"));
    p
}

/// A previous output moved into a hidden holder directory; the holder is deleted on drop.
struct Retired {
    holder: tempfile::TempDir,
    old: PathBuf,
}

fn swap_into_place(
    stage: tempfile::TempDir,
    parent: &Path,
    name: &OsStr,
    base_dir: &Path,
) -> IconsetResult<()> {
    let retired = retire_existing(parent, name, base_dir)?;
    install(stage.keep(), base_dir, retired)
}

fn retire_existing(
    parent: &Path,
    name: &OsStr,
    base_dir: &Path,
) -> IconsetResult<Option<Retired>> {
    if fs::symlink_metadata(base_dir).is_err() {
        return Ok(None);
    }
    let holder = tempfile::Builder::new()
        .prefix(&hidden_prefix(name, "old"))
        .tempdir_in(parent)
        .map_err(|e| IconsetError::write(WriteOp::CreateDir, parent, e))?;
    let old = holder.path().join(name);
    fs::rename(base_dir, &old).map_err(|e| IconsetError::write(WriteOp::SwapDir, base_dir, e))?;
    Ok(Some(Retired { holder, old }))
}

/// Rename `staged` to `base_dir`, then drop the retired copy.
///
/// If the rename fails the retired copy is moved back. If that also fails the holder is kept on
/// disk and the error names where the previous output now lives.
fn install(staged: PathBuf, base_dir: &Path, retired: Option<Retired>) -> IconsetResult<()> {
    if let Err(swap) = fs::rename(&staged, base_dir) {
        if let Err(e) = fs::remove_dir_all(&staged)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(
                stage = %staged.display(),
                error = %e,
                "could not remove staging directory"
            );
        }
        if let Some(Retired { holder, old }) = retired
            && let Err(restore) = fs::rename(&old, base_dir)
        {
            let kept = holder.keep();
            tracing::error!(
                previous = %old.display(),
                holder = %kept.display(),
                "previous output could not be restored"
            );
            let reason = format!(
                "swap into '{}' failed ({swap}) and restoring the previous output failed: {restore}",
                base_dir.display()
            );
            return Err(IconsetError::write(
                WriteOp::RestoreDir,
                old,
                io::Error::new(restore.kind(), reason),
            ));
        }
        return Err(IconsetError::write(WriteOp::SwapDir, base_dir, swap));
    }

    if let Some(Retired { holder, .. }) = retired {
        let holder_path = holder.path().to_path_buf();
        holder
            .close()
            .map_err(|e| IconsetError::write(WriteOp::RemoveDir, holder_path, e))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/output/materialize.rs"]
mod tests;
