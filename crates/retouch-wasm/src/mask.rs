//! Mask export for masks painted on a host canvas.
//!
//! The editor paints masks itself (see `Editor`); this covers the case where
//! the page keeps its own mask canvas and only needs the two-tone hand-off
//! buffer built from its `ImageData`.

use retouch_core::mask::MaskRaster;
use retouch_core::surface::RasterSurface;
use wasm_bindgen::prelude::*;

fn raster_from_rgba(rgba: &[u8], width: u32, height: u32) -> Result<MaskRaster, String> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(format!(
            "Invalid mask data: expected {expected} bytes, got {}",
            rgba.len()
        ));
    }

    let mut mask = MaskRaster::new(width, height);
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        if px[3] > 0 {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            mask.write_pixel(x, y, [px[0], px[1], px[2], px[3]])
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(mask)
}

/// Turn canvas RGBA data into the two-tone inpainting mask PNG: any
/// non-zero alpha becomes opaque black, the rest opaque white.
#[wasm_bindgen]
pub fn export_mask_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    raster_from_rgba(rgba, width, height)
        .map_err(|e| JsValue::from_str(&e))?
        .export_png()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
