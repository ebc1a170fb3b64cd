//! CPU-side PNG output of a rendered [`Raster`].
//!
//! This module is feature-gated behind `png` (default on) so that WASM builds
//! can depend on the `engines` crate without pulling in the `image` crate.
//! The pixel buffer conversion itself lives in [`crate::pixel`] (always available).

use std::path::Path;

use particle_field_core::error::EngineError;
use particle_field_core::Raster;

use crate::pixel::raster_to_rgba;

/// Writes a raster as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), EngineError> {
    let rgba = raster_to_rgba(raster);
    let w = u32::try_from(raster.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(raster.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_seed;
    use particle_field_core::{Seed, Srgb};

    #[test]
    fn write_png_round_trip() {
        let mut seed = Seed::new("network", 40, 24, 42);
        seed.ticks = 3;
        let render = render_seed(&seed).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.png");

        write_png(&render.raster, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 40);
        assert_eq!(img.height(), 24);
        assert_eq!(img.into_raw(), raster_to_rgba(&render.raster));
    }

    #[test]
    fn write_png_into_missing_directory_is_io_error() {
        let raster = Raster::new(2, 2, Srgb::BLACK).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&raster, &path), Err(EngineError::Io(_))));
    }
}
