//! Solid-color PNG tile encoding.

use crate::coords::Coord;
use crate::error::RenderError;

/// File extension of every rendered tile.
pub const TILE_EXT: &str = "png";

/// Encodes a `tile_size` × `tile_size` RGB PNG filled with the coordinate's
/// color. Deterministic: the same coordinate always yields identical bytes.
pub fn render_tile(coord: Coord, tile_size: u32) -> Result<Vec<u8>, RenderError> {
    let pixel_count = tile_size as usize * tile_size as usize;
    let mut pixels = Vec::with_capacity(pixel_count * 3);
    for _ in 0..pixel_count {
        pixels.extend_from_slice(&[coord.c0, coord.c1, coord.c2]);
    }

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, tile_size, tile_size);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|source| RenderError::Encode { coord, source })?;
    writer
        .write_image_data(&pixels)
        .map_err(|source| RenderError::Encode { coord, source })?;
    writer
        .finish()
        .map_err(|source| RenderError::Encode { coord, source })?;
    Ok(out)
}
