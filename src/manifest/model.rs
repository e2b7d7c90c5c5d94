use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{IconsetError, IconsetResult};
use crate::foundation::raster::MAX_EDGE;

/// Target device class of a manifest entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Idiom {
    /// iPhone home screen, spotlight and settings icons.
    Iphone,
    /// iPad home screen, spotlight and settings icons.
    Ipad,
    /// App Store listing artwork.
    IosMarketing,
    /// Single-size universal icon.
    Universal,
    /// macOS app icon.
    Mac,
    /// watchOS app icon.
    Watch,
    /// watchOS store artwork.
    WatchMarketing,
    /// CarPlay icon.
    Car,
}

/// Integer scale factor parsed from `"<int>x"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scale(pub u32);

impl Scale {
    /// Parse `"2x"`-style text. The factor must be a positive integer.
    pub fn parse(s: &str) -> IconsetResult<Self> {
        let n = s
            .strip_suffix('x')
            .filter(|n| is_digits(n))
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| IconsetError::manifest(format!("scale '{s}' is not '<int>x'")))?;
        if n == 0 {
            return Err(IconsetError::manifest(format!("scale '{s}' must be positive")));
        }
        Ok(Self(n))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Logical point size parsed from `"<num>x<num>"`.
///
/// Icons are square: only `width` drives pixel derivation. `height` is parsed so malformed text
/// is rejected, but it is never compared against `width`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogicalSize {
    /// First component; the edge length used for derivation.
    pub width: f64,
    /// Second component, carried as written.
    pub height: f64,
}

impl LogicalSize {
    /// Parse `"83.5x83.5"`-style text. Both components must be positive finite numbers.
    pub fn parse(s: &str) -> IconsetResult<Self> {
        let bad = || IconsetError::manifest(format!("size '{s}' is not '<num>x<num>'"));
        let (w, h) = s.split_once('x').ok_or_else(bad)?;
        let width = parse_positive(w).ok_or_else(bad)?;
        let height = parse_positive(h).ok_or_else(bad)?;
        Ok(Self { width, height })
    }
}

fn parse_positive(s: &str) -> Option<f64> {
    let plain = match s.split_once('.') {
        Some((int, frac)) => is_digits(int) && is_digits(frac),
        None => is_digits(s),
    };
    if !plain {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for LogicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One required output image.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    /// Output file name, unique within the manifest and written directly under the output dir.
    pub filename: String,
    /// Device class.
    pub idiom: Idiom,
    /// Pixel multiplier.
    pub scale: Scale,
    /// Logical point size.
    pub size: LogicalSize,
}

impl ManifestEntry {
    /// Edge length in pixels: `round(size.width * scale)`, rounding half away from zero.
    ///
    /// Must land in `1..=MAX_EDGE`.
    pub fn target_pixel_size(&self) -> IconsetResult<u32> {
        let px = (self.size.width * f64::from(self.scale.0)).round();
        if !px.is_finite() || px < 1.0 || px > f64::from(MAX_EDGE) {
            return Err(IconsetError::manifest(format!(
                "entry '{}': size {} at {} gives unusable pixel size {px}",
                self.filename, self.size, self.scale
            )));
        }
        Ok(px as u32)
    }
}

/// Free-form metadata carried through to the output unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInfo {
    /// Authoring tool.
    pub author: String,
    /// Document format version.
    pub version: u32,
}

#[derive(Deserialize)]
struct ManifestDoc {
    images: Vec<EntryDoc>,
    #[serde(default)]
    info: Option<ManifestInfo>,
}

#[derive(Deserialize)]
struct EntryDoc {
    filename: String,
    idiom: Idiom,
    scale: String,
    size: String,
}

/// Parsed, immutable icon manifest.
///
/// Keeps the exact document text it was parsed from so the output can carry it verbatim.
#[derive(Clone, Debug)]
pub struct IconManifest {
    entries: Vec<ManifestEntry>,
    info: Option<ManifestInfo>,
    document: String,
}

impl IconManifest {
    /// Parse and validate a JSON manifest document.
    ///
    /// Rejects missing entry fields, unknown idioms, malformed `scale`/`size` text, entries whose
    /// pixel size rounds below 1, and duplicate or non-plain filenames.
    pub fn parse(document: &str) -> IconsetResult<Self> {
        let doc: ManifestDoc = serde_json::from_str(document)
            .map_err(|e| IconsetError::manifest(format!("parse manifest JSON: {e}")))?;

        let mut seen = HashSet::with_capacity(doc.images.len());
        let mut entries = Vec::with_capacity(doc.images.len());
        for (i, raw) in doc.images.into_iter().enumerate() {
            if !is_plain_file_name(&raw.filename) {
                return Err(IconsetError::manifest(format!(
                    "images[{i}]: filename '{}' must be a plain file name",
                    raw.filename
                )));
            }
            if !seen.insert(raw.filename.clone()) {
                return Err(IconsetError::manifest(format!(
                    "images[{i}]: duplicate filename '{}'",
                    raw.filename
                )));
            }
            let scale = Scale::parse(&raw.scale).map_err(in_entry(i, &raw.filename))?;
            let size = LogicalSize::parse(&raw.size).map_err(in_entry(i, &raw.filename))?;
            let entry = ManifestEntry {
                filename: raw.filename,
                idiom: raw.idiom,
                scale,
                size,
            };
            entry.target_pixel_size()?;
            entries.push(entry);
        }

        Ok(Self {
            entries,
            info: doc.info,
            document: document.to_owned(),
        })
    }

    /// Read and parse a manifest document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> IconsetResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            IconsetError::manifest(format!("read manifest '{}': {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// The fixed manifest shipped with this tool version.
    pub fn builtin() -> IconsetResult<Self> {
        Self::parse(crate::manifest::builtin::APP_ICON_MANIFEST)
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Document metadata, if present.
    pub fn info(&self) -> Option<&ManifestInfo> {
        self.info.as_ref()
    }

    /// The exact text this manifest was parsed from.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the manifest lists no images.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn in_entry(i: usize, filename: &str) -> impl FnOnce(IconsetError) -> IconsetError + '_ {
    move |e| match e {
        IconsetError::ManifestParse(msg) => {
            IconsetError::manifest(format!("images[{i}] '{filename}': {msg}"))
        }
        other => other,
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
