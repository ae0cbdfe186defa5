//! The stateful editor exposed to the page.
//!
//! `Editor` wraps a core `Workspace`. The page forwards layout changes,
//! pointer, wheel and key events, and reads back the state it needs to draw.
//! Backend calls stay on the JavaScript side; the editor prepares their
//! payloads and tracks the quota cooldown.
//!
//! # Example
//!
//! ```typescript
//! import { Editor } from '@retouch/wasm';
//!
//! const editor = new Editor({ brushSize: 30 });
//! editor.set_viewport(rect.left, rect.top, rect.width, rect.height);
//! editor.load(bytes);
//! editor.enter_edit();
//! editor.rotate_right();
//! if (editor.apply_edit()) draw(editor.image());
//! ```

use crate::types::{interpolation_from_str, JsDecodedImage};
use retouch_core::backend::BackendRequest;
use retouch_core::config::EditorConfig;
use retouch_core::encode::ExportFormat;
use retouch_core::filter::FilterKind;
use retouch_core::geometry::{Point, Rect, Size, Viewport};
use retouch_core::session::{EditKey, EditSession, KeyInput, KeyOutcome, Workspace};
use wasm_bindgen::prelude::*;

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub(crate) fn filter_kind_from_str(name: &str) -> Option<FilterKind> {
    match name {
        "none" => Some(FilterKind::None),
        "sepia" => Some(FilterKind::Sepia),
        "grayscale" => Some(FilterKind::Grayscale),
        "vintage" => Some(FilterKind::Vintage),
        _ => None,
    }
}

fn key_outcome_name(outcome: KeyOutcome) -> &'static str {
    match outcome {
        KeyOutcome::Undo => "undo",
        KeyOutcome::Redo => "redo",
        KeyOutcome::CropDrawingCancelled => "cropDrawingCancelled",
        KeyOutcome::CropToolClosed => "cropToolClosed",
        KeyOutcome::FiltersPanelClosed => "filtersPanelClosed",
        KeyOutcome::CancelSession => "cancelSession",
        KeyOutcome::Ignored => "ignored",
    }
}

/// A payload for the generative backend.
#[wasm_bindgen]
pub struct JsBackendRequest {
    inner: BackendRequest,
}

#[wasm_bindgen]
impl JsBackendRequest {
    pub fn image(&self) -> Vec<u8> {
        self.inner.image.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn image_mime_type(&self) -> String {
        self.inner.image.mime_type.clone()
    }

    /// The two-tone mask PNG, when the request came from a mask session.
    pub fn mask(&self) -> Option<Vec<u8>> {
        self.inner.mask.as_ref().map(|mask| mask.bytes.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn instructions(&self) -> String {
        self.inner.instructions.clone()
    }
}

/// A classified backend failure.
#[wasm_bindgen]
pub struct JsBackendFailure {
    quota: bool,
    message: String,
}

#[wasm_bindgen]
impl JsBackendFailure {
    #[wasm_bindgen(getter)]
    pub fn is_quota(&self) -> bool {
        self.quota
    }

    /// Text to show the user.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

#[wasm_bindgen]
pub struct Editor {
    workspace: Workspace,
}

impl Editor {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            workspace: Workspace::new(config),
        }
    }

    fn session(&self) -> Option<&EditSession> {
        self.workspace.edit_session()
    }

    fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.workspace.edit_session_mut()
    }

    /// Run `f` on the edit session; false when not editing.
    fn edit(&mut self, f: impl FnOnce(&mut EditSession)) -> bool {
        match self.session_mut() {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }
}

#[wasm_bindgen]
impl Editor {
    /// Create an editor. `config` is a partial `EditorConfig` object or
    /// `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Editor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js)?
        };
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.workspace.config()).map_err(to_js)
    }

    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: EditorConfig = serde_wasm_bindgen::from_value(config).map_err(to_js)?;
        self.workspace.set_config(config);
        Ok(())
    }

    /// Choose the resampling filter used when applying a straightened edit.
    pub fn set_interpolation(&mut self, name: &str) {
        let config = EditorConfig {
            interpolation: interpolation_from_str(name),
            ..self.workspace.config().clone()
        };
        self.workspace.set_config(config);
    }

    // Image

    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.workspace.load(bytes).map_err(to_js)
    }

    pub fn set_image(&mut self, image: &JsDecodedImage) {
        self.workspace.set_image(image.to_decoded());
    }

    pub fn image(&self) -> Option<JsDecodedImage> {
        self.workspace
            .image()
            .map(|image| JsDecodedImage::from_decoded(image.clone()))
    }

    /// `"viewing"`, `"editing"` or `"masking"`.
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.workspace.mode().name().to_string()
    }

    // Viewing

    pub fn set_viewport(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.workspace
            .set_viewport(Viewport::new(Point::new(x, y), Size::new(width, height)));
    }

    pub fn set_side_by_side(&mut self, side_by_side: bool) {
        self.workspace.set_side_by_side(side_by_side);
    }

    pub fn fit_all(&mut self) -> bool {
        self.workspace.fit_all()
    }

    pub fn fit_to_height(&mut self) -> bool {
        self.workspace.fit_to_height()
    }

    /// Zoom of whatever is on screen: the edit state's while editing.
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.session()
            .map_or(self.workspace.zoom(), |session| session.current().edit_zoom)
    }

    #[wasm_bindgen(getter)]
    pub fn pan_x(&self) -> f64 {
        self.session()
            .map_or(self.workspace.pan().x, |session| session.preview_pan().x)
    }

    #[wasm_bindgen(getter)]
    pub fn pan_y(&self) -> f64 {
        self.session()
            .map_or(self.workspace.pan().y, |session| session.preview_pan().y)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.workspace.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.workspace.zoom_out()
    }

    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.workspace.wheel(delta_y)
    }

    pub fn pan_start(&mut self, x: f64, y: f64) -> bool {
        self.workspace.begin_pan(Point::new(x, y))
    }

    pub fn pan_move(&mut self, x: f64, y: f64) -> bool {
        self.workspace.move_pan(Point::new(x, y))
    }

    pub fn pan_end(&mut self) -> bool {
        self.workspace.end_pan()
    }

    // Modes

    pub fn enter_edit(&mut self) -> bool {
        self.workspace.enter_edit()
    }

    pub fn enter_mask(&mut self) -> bool {
        self.workspace.enter_mask()
    }

    pub fn cancel(&mut self) {
        self.workspace.cancel();
    }

    // Edit session

    pub fn rotate_left(&mut self) -> bool {
        self.edit(EditSession::rotate_left)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.edit(EditSession::rotate_right)
    }

    pub fn flip(&mut self) -> bool {
        self.edit(EditSession::flip)
    }

    pub fn straighten(&mut self, angle: f64) -> bool {
        self.edit(|session| session.straighten(angle))
    }

    /// Select `"none"`, `"sepia"`, `"grayscale"` or `"vintage"`.
    pub fn select_filter(&mut self, name: &str) -> Result<bool, JsValue> {
        let kind = filter_kind_from_str(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown filter: {name}")))?;
        Ok(self.edit(|session| session.select_filter(kind)))
    }

    pub fn set_filter_intensity(&mut self, intensity: u8) -> bool {
        self.edit(|session| session.set_filter_intensity(intensity))
    }

    pub fn toggle_filters_panel(&mut self) -> bool {
        self.edit(EditSession::toggle_filters_panel)
    }

    pub fn toggle_crop_tool(&mut self) -> bool {
        self.edit(EditSession::toggle_crop_tool)
    }

    pub fn crop_start(&mut self, x: f64, y: f64) -> bool {
        self.session_mut()
            .is_some_and(|session| session.crop_pointer_down(Point::new(x, y)))
    }

    pub fn crop_move(&mut self, x: f64, y: f64) -> bool {
        self.session_mut()
            .is_some_and(|session| session.crop_pointer_move(Point::new(x, y)))
    }

    pub fn crop_end(&mut self) -> bool {
        self.session_mut().is_some_and(EditSession::crop_pointer_up)
    }

    /// The crop rectangle to outline, in screen coordinates.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        match self.session().and_then(EditSession::crop_preview) {
            Some(crop) => serde_wasm_bindgen::to_value(&crop.normalized()).map_err(to_js),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Screen rectangle of the edited image in the preview.
    pub fn display_rect(&self) -> Result<JsValue, JsValue> {
        match self.session() {
            Some(session) => serde_wasm_bindgen::to_value(&session.display_rect()).map_err(to_js),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn undo(&mut self) -> bool {
        self.session_mut().is_some_and(EditSession::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.session_mut().is_some_and(EditSession::redo)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), JsValue> {
        match self.session_mut() {
            Some(session) => session.jump_to(index).map_err(to_js),
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) -> bool {
        self.edit(EditSession::reset)
    }

    /// Handle a `keydown`. Returns what happened, `"ignored"` if nothing.
    pub fn key_down(&mut self, key: &str, modifier: bool, shift: bool) -> String {
        let input = KeyInput {
            key: EditKey::from_key_name(key),
            modifier,
            shift,
        };
        key_outcome_name(self.workspace.handle_key(input)).to_string()
    }

    /// The current `EditState` as a plain object.
    pub fn edit_state(&self) -> Result<JsValue, JsValue> {
        match self.session() {
            Some(session) => serde_wasm_bindgen::to_value(session.current()).map_err(to_js),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Action keys of every history entry, for the history list.
    pub fn history_labels(&self) -> Vec<String> {
        self.session().map_or_else(Vec::new, |session| {
            session
                .history()
                .entries()
                .iter()
                .map(|entry| entry.action.key().to_string())
                .collect()
        })
    }

    pub fn history_index(&self) -> Option<usize> {
        self.session().map(|session| session.history().index())
    }

    /// Commit the edit session into a new image. False when not editing or
    /// the layout is not measured yet.
    pub fn apply_edit(&mut self) -> Result<bool, JsValue> {
        self.workspace.apply_edit().map_err(to_js)
    }

    // Background removal

    pub fn remove_background(&mut self) -> bool {
        self.workspace.remove_background()
    }

    // Mask session

    pub fn set_brush_size(&mut self, size: f64) {
        if let Some(mask) = self.workspace.mask_session_mut() {
            mask.set_brush_size(size);
        }
    }

    /// Start a stroke. `rect_*` is the on-screen box of the mask canvas.
    pub fn mask_start(&mut self, x: f64, y: f64, rect_x: f64, rect_y: f64, rect_w: f64, rect_h: f64) -> bool {
        self.workspace
            .mask_pointer_down(Point::new(x, y), Rect::new(rect_x, rect_y, rect_w, rect_h))
    }

    pub fn mask_move(&mut self, x: f64, y: f64, rect_x: f64, rect_y: f64, rect_w: f64, rect_h: f64) -> bool {
        self.workspace
            .mask_pointer_move(Point::new(x, y), Rect::new(rect_x, rect_y, rect_w, rect_h))
    }

    pub fn mask_end(&mut self) {
        self.workspace.mask_pointer_up();
    }

    pub fn clear_mask(&mut self) {
        if let Some(mask) = self.workspace.mask_session_mut() {
            mask.clear();
        }
    }

    /// RGBA overlay to draw over the image while masking.
    pub fn mask_overlay(&self) -> Option<Vec<u8>> {
        self.workspace
            .mask_session()
            .map(|mask| mask.raster().overlay_rgba())
    }

    // Backend hand-off

    /// Payload for a prompt-only request on the current image.
    pub fn prepare_request(&mut self, instructions: &str) -> Result<Option<JsBackendRequest>, JsValue> {
        self.workspace.check_cooldown(now_ms()).map_err(to_js)?;
        let request = self.workspace.request(instructions).map_err(to_js)?;
        Ok(request.map(|inner| JsBackendRequest { inner }))
    }

    /// Payload carrying the painted mask. Clears the mask.
    pub fn prepare_mask_request(&mut self, instructions: &str) -> Result<Option<JsBackendRequest>, JsValue> {
        self.workspace.check_cooldown(now_ms()).map_err(to_js)?;
        let request = self.workspace.mask_request(instructions).map_err(to_js)?;
        Ok(request.map(|inner| JsBackendRequest { inner }))
    }

    /// Classify a backend failure message; quota failures start the
    /// cooldown.
    pub fn report_backend_failure(&mut self, message: &str) -> JsBackendFailure {
        let err = self.workspace.report_backend_failure(message, now_ms());
        JsBackendFailure {
            quota: err.is_quota(),
            message: err.to_string(),
        }
    }

    pub fn cooldown_remaining_secs(&self) -> u32 {
        self.workspace.cooldown_remaining_secs(now_ms())
    }

    // Export

    pub fn export_png(&self) -> Result<Option<Vec<u8>>, JsValue> {
        self.workspace.export(ExportFormat::Png, None).map_err(to_js)
    }

    /// JPEG at the configured quality, with an optional comment.
    pub fn export_jpeg(&self, comment: Option<String>) -> Result<Option<Vec<u8>>, JsValue> {
        let quality = self.workspace.config().jpeg_quality;
        self.workspace
            .export(ExportFormat::Jpeg { quality }, comment.as_deref())
            .map_err(to_js)
    }
}
