use std::fs;
use std::path::Path;

use crate::foundation::error::{IconsetError, IconsetResult};
use crate::foundation::raster::{
    Raster, premultiply_rgba8_in_place, premultiply_rgba16_in_place,
};

/// Edge length, in pixels, the built-in manifest is authored for.
pub const MASTER_SIZE: u32 = 1024;

/// Validated master image.
///
/// Pixels are converted to premultiplied RGBA on load, 16 bits per channel when the source has
/// more than 8 and 8 otherwise. The decoder's native color type is kept for diagnostics. Immutable once constructed, so it can be shared across render workers.
#[derive(Debug)]
pub struct MasterImage {
    raster: Raster,
    source_color: image::ColorType,
}

impl MasterImage {
    /// Decode PNG `bytes` and check the fixed `MASTER_SIZE` square precondition.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn load(bytes: &[u8]) -> IconsetResult<Self> {
        let dyn_img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| IconsetError::decode(format!("decode master PNG: {e}")))?;
        let source_color = dyn_img.color();
        let (width, height) = (dyn_img.width(), dyn_img.height());
        if width != MASTER_SIZE || height != MASTER_SIZE {
            return Err(IconsetError::DimensionMismatch {
                expected: MASTER_SIZE,
                width,
                height,
            });
        }

        let raster = if is_deep(source_color) {
            let mut buf = dyn_img.into_rgba16();
            premultiply_rgba16_in_place(&mut buf);
            Raster::Rgba16(buf)
        } else {
            let mut buf = dyn_img.into_rgba8();
            premultiply_rgba8_in_place(&mut buf);
            Raster::Rgba8(buf)
        };

        tracing::debug!(?source_color, width, height, "loaded master image");
        Ok(Self {
            raster,
            source_color,
        })
    }

    /// Read a master image from disk and validate it.
    pub fn load_path(path: impl AsRef<Path>) -> IconsetResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| IconsetError::UnreadableSource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&bytes)
    }

    /// Premultiplied RGBA pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Edge length in pixels.
    pub fn size(&self) -> u32 {
        self.raster.width()
    }

    /// Color type reported by the decoder before conversion.
    pub fn source_color(&self) -> image::ColorType {
        self.source_color
    }

    /// Whether the decoded source carried an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.source_color.has_alpha()
    }
}

fn is_deep(color: image::ColorType) -> bool {
    color.bits_per_pixel() / u16::from(color.channel_count()) > 8
}

#[cfg(test)]
#[path = "../../tests/unit/source/load.rs"]
mod tests;
