//! Retouch WASM - WebAssembly bindings for the Retouch edit pipeline
//!
//! This crate exposes retouch-core to the browser client. It holds no
//! pipeline logic of its own.
//!
//! # Module Structure
//!
//! - `editor` - The stateful `Editor`: viewing, edit and mask sessions
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding with EXIF orientation
//! - `encode` - PNG and JPEG export
//! - `matting` - Chroma-key background removal
//! - `mask` - Two-tone mask export for host-painted masks
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, remove_background } from '@retouch/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const cutout = remove_background(image, 20);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod encode;
mod logger;
mod mask;
mod matting;
mod types;

pub use decode::{decode_image, decode_image_raw_orientation, image_orientation};
pub use editor::{Editor, JsBackendFailure, JsBackendRequest};
pub use encode::{encode_jpeg, encode_png, read_jpeg_comment};
pub use mask::export_mask_png;
pub use matting::{detect_background, remove_background};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load).
///
/// Installs the console logger at `info` level. Safe to call again.
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Change the console log level: `off`, `error`, `warn`, `info`, `debug` or
/// `trace`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
        set_log_level("warn");
    }
}
