use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::foundation::error::{IconsetError, IconsetResult};
use crate::foundation::raster::Raster;

/// Encode a premultiplied raster as an RGBA PNG at the raster's bit depth.
///
/// PNG stores straight alpha, so pixels are un-premultiplied first. Encoder settings are fixed so
/// identical rasters always produce identical bytes. `filename` is only used for error context.
pub fn encode_png(filename: &str, raster: &Raster) -> IconsetResult<Vec<u8>> {
    let mut buf = Vec::new();
    let enc = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    let written = match raster.to_straight() {
        Raster::Rgba8(img) => img.write_with_encoder(enc),
        Raster::Rgba16(img) => img.write_with_encoder(enc),
    };
    written.map_err(|e| IconsetError::encode(filename, e))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
