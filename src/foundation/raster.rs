use image::{ImageBuffer, Rgba, RgbaImage};

use crate::foundation::error::{IconsetError, IconsetResult};

/// 16-bit RGBA image buffer.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Largest edge length, in pixels, a raster may be resampled to.
pub const MAX_EDGE: u32 = 8192;

/// Pixel layout carried by a [`Raster`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGBA, alpha last, color channels premultiplied by alpha.
    Rgba8Premul,
    /// 16-bit RGBA, alpha last, color channels premultiplied by alpha.
    Rgba16Premul,
}

/// Owned premultiplied RGBA pixel buffer, at the bit depth of the source it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Raster {
    /// 8 bits per channel.
    Rgba8(RgbaImage),
    /// 16 bits per channel.
    Rgba16(Rgba16Image),
}

impl Raster {
    /// Wrap a premultiplied RGBA8 buffer after checking its length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> IconsetResult<Self> {
        let len = data.len();
        if sample_len(width, height) != Some(len) {
            return Err(bad_len(width, height, len, PixelFormat::Rgba8Premul));
        }
        ImageBuffer::from_raw(width, height, data)
            .map(Self::Rgba8)
            .ok_or_else(|| bad_len(width, height, len, PixelFormat::Rgba8Premul))
    }

    /// Wrap a premultiplied RGBA16 buffer after checking its length.
    pub fn from_premul16(width: u32, height: u32, data: Vec<u16>) -> IconsetResult<Self> {
        let len = data.len();
        if sample_len(width, height) != Some(len) {
            return Err(bad_len(width, height, len, PixelFormat::Rgba16Premul));
        }
        ImageBuffer::from_raw(width, height, data)
            .map(Self::Rgba16)
            .ok_or_else(|| bad_len(width, height, len, PixelFormat::Rgba16Premul))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Self::Rgba8(buf) => buf.width(),
            Self::Rgba16(buf) => buf.width(),
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Self::Rgba8(buf) => buf.height(),
            Self::Rgba16(buf) => buf.height(),
        }
    }

    /// Pixel format of the buffer.
    pub fn format(&self) -> PixelFormat {
        match self {
            Self::Rgba8(_) => PixelFormat::Rgba8Premul,
            Self::Rgba16(_) => PixelFormat::Rgba16Premul,
        }
    }

    /// The 8-bit buffer, if this raster is 8-bit.
    pub fn as_rgba8(&self) -> Option<&RgbaImage> {
        match self {
            Self::Rgba8(buf) => Some(buf),
            Self::Rgba16(_) => None,
        }
    }

    /// The 16-bit buffer, if this raster is 16-bit.
    pub fn as_rgba16(&self) -> Option<&Rgba16Image> {
        match self {
            Self::Rgba16(buf) => Some(buf),
            Self::Rgba8(_) => None,
        }
    }

    /// Copy out the pixels with straight (non-premultiplied) alpha.
    pub fn to_straight(&self) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Rgba8(buf) => unpremultiply_rgba8_in_place(buf),
            Self::Rgba16(buf) => unpremultiply_rgba16_in_place(buf),
        }
        out
    }
}

fn sample_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

fn bad_len(width: u32, height: u32, len: usize, format: PixelFormat) -> IconsetError {
    IconsetError::resample(format!(
        "raster buffer has {len} samples, expected {width}x{height}x4 for {format:?}"
    ))
}

/// Convert straight-alpha RGBA8 to premultiplied, rounding to nearest.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Convert premultiplied RGBA8 back to straight alpha, rounding to nearest.
///
/// Fully transparent pixels become `[0, 0, 0, 0]`.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            let v = (*c as u32 * 255 + a / 2) / a;
            *c = v.min(255) as u8;
        }
    }
}

/// 16-bit counterpart of [`premultiply_rgba8_in_place`].
pub fn premultiply_rgba16_in_place(rgba: &mut [u16]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0xFFFF {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u32 * a + 0x7FFF) / 0xFFFF) as u16;
        }
    }
}

/// 16-bit counterpart of [`unpremultiply_rgba8_in_place`].
pub fn unpremultiply_rgba16_in_place(rgba: &mut [u16]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u64;
        if a == 0xFFFF {
            continue;
        }
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            let v = (*c as u64 * 0xFFFF + a / 2) / a;
            *c = v.min(0xFFFF) as u16;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
