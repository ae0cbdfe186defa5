//! Retouch Core - local raster edit pipeline
//!
//! This crate holds everything the Retouch editor does to pixels on the
//! client: geometry between source, transformed and screen space, the
//! undo/redo edit history, freehand inpainting masks, chroma-key background
//! removal and the compositor that renders an edit into one final raster.
//! The browser bindings live in `retouch-wasm`.

pub mod backend;
pub mod compose;
pub mod config;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod mask;
pub mod matting;
pub mod session;
pub mod surface;
pub mod transform;

pub use backend::{BackendError, BackendOutput, BackendRequest, GenerativeBackend, QuotaCooldown};
pub use compose::{compose, compose_encoded, resolve_source_rect, ComposeError, SourceRegion};
pub use config::{EditLimits, EditorConfig};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode_image, EncodeError, ExportFormat};
pub use filter::{FilterKind, FilterState};
pub use geometry::{CropBox, Point, Rect, Size, Viewport};
pub use history::{EditAction, EditHistory, EditPatch, EditState, HistoryError};
pub use mask::MaskRaster;
pub use matting::{remove_background, BackgroundColors};
pub use session::{EditKey, EditSession, KeyInput, KeyOutcome, MaskSession, Mode, Workspace};
pub use surface::{RasterSurface, SurfaceError};
pub use transform::{render_transformed, InterpolationFilter, TransformParams};
