use image::imageops::{self, FilterType};

use crate::foundation::error::{IconsetError, IconsetResult};
use crate::foundation::raster::{MAX_EDGE, Raster};

/// Filter used for every resize.
///
/// `image` widens the kernel by the scale ratio when shrinking, so each output pixel averages the
/// source pixels it covers; when enlarging it interpolates bilinearly.
const FILTER: FilterType = FilterType::Triangle;

/// Resample `src` to a `target x target` square.
///
/// Works on premultiplied pixels so transparent edges do not bleed color, and keeps the source bit
/// depth. Output is deterministic for a given input.
pub fn resample(src: &Raster, target: u32) -> IconsetResult<Raster> {
    resample_to(src, target, target)
}

/// Resample `src` to `width x height`. See [`resample`].
pub fn resample_to(src: &Raster, width: u32, height: u32) -> IconsetResult<Raster> {
    if width < 1 || height < 1 {
        return Err(IconsetError::resample(format!(
            "target size must be >= 1, got {width}x{height}"
        )));
    }
    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(IconsetError::resample(format!(
            "target size {width}x{height} exceeds the {MAX_EDGE}px limit"
        )));
    }
    if src.width() < 1 || src.height() < 1 {
        return Err(IconsetError::resample("source raster is empty"));
    }
    if src.width() == width && src.height() == height {
        return Ok(src.clone());
    }

    let out = match src {
        Raster::Rgba8(buf) => {
            let mut out = imageops::resize(buf, width, height, FILTER);
            clamp_color_to_alpha(&mut out);
            Raster::Rgba8(out)
        }
        Raster::Rgba16(buf) => {
            let mut out = imageops::resize(buf, width, height, FILTER);
            clamp_color_to_alpha(&mut out);
            Raster::Rgba16(out)
        }
    };
    Ok(out)
}

/// Premultiplied color can never exceed alpha; filter rounding may push it one step over.
fn clamp_color_to_alpha<T: Copy + Ord>(samples: &mut [T]) {
    for px in samples.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = (*c).min(a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/resample.rs"]
mod tests;
