//! `appiconset` turns one square master image into a complete asset-catalog icon set.
//!
//! # Pipeline overview
//!
//! 1. **Manifest**: parse the declarative list of required outputs ([`IconManifest`]) and derive
//!    each entry's pixel size (`round(size * scale)`)
//! 2. **Load**: decode the master PNG and check it is exactly [`MASTER_SIZE`] square ([`MasterImage`])
//! 3. **Resample**: resize each entry from the master with `image`'s triangle filter ([`resample`])
//! 4. **Materialize**: encode PNGs and replace the output directory ([`materialize`])
//!
//! Pixels are premultiplied RGBA end-to-end, at 8 or 16 bits per channel following the master,
//! and are un-premultiplied only when encoded to PNG.
//! Every error aborts the run; see [`IconsetError`] for the closed set of categories.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod encode;
mod foundation;
mod manifest;
mod output;
mod pipeline;
mod render;
mod source;

pub use encode::png::encode_png;
pub use foundation::error::{IconsetError, IconsetResult, WriteOp};
pub use foundation::raster::{
    MAX_EDGE, PixelFormat, Raster, Rgba16Image, premultiply_rgba8_in_place,
    premultiply_rgba16_in_place, unpremultiply_rgba8_in_place, unpremultiply_rgba16_in_place,
};
pub use manifest::builtin::APP_ICON_MANIFEST;
pub use manifest::model::{IconManifest, Idiom, LogicalSize, ManifestEntry, ManifestInfo, Scale};
pub use output::materialize::{
    APPICONSET_DIR, CONTENTS_FILE, EncodedImage, MaterializeReport, encode_all, materialize,
    materialize_encoded,
};
pub use pipeline::{
    GenerateOpts, GenerateReport, RenderThreading, generate_appiconset,
    generate_appiconset_from_master, generate_appiconset_from_path, render_all,
};
pub use render::resample::{resample, resample_to};
pub use source::load::{MASTER_SIZE, MasterImage};
