//! Pure-computation pixel buffer conversion from a [`Raster`].
//!
//! This module is always available (no feature gate) so that both the `png`
//! snapshot path and any `ImageData` consumer share the same conversion.

use particle_field_core::Raster;

/// Converts a raster to an RGBA8 buffer of length `width * height * 4`.
///
/// Rasters are opaque, so alpha is always 255.
pub fn raster_to_rgba(raster: &Raster) -> Vec<u8> {
    raster
        .pixels()
        .iter()
        .flat_map(|&px| {
            let [r, g, b] = px.to_rgb8();
            [r, g, b, 255u8]
        })
        .collect()
}
