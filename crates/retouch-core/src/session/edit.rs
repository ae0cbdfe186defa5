//! A single edit session: the history, the crop tool, live pan drags,
//! keyboard handling and the final apply.

use crate::compose::{compose, resolve_source_rect, ComposeError, SourceRegion};
use crate::config::EditorConfig;
use crate::decode::DecodedImage;
use crate::filter::{FilterKind, FilterState};
use crate::geometry::{fit_zoom, CropBox, Point, Rect, Size, Viewport};
use crate::history::{
    ContinuousAction, DiscreteAction, EditAction, EditHistory, EditPatch, EditState, HistoryError,
};

const ZOOM: EditAction = EditAction::Continuous(ContinuousAction::Zoom);
const STRAIGHTEN: EditAction = EditAction::Continuous(ContinuousAction::Straighten);
const PAN: EditAction = EditAction::Continuous(ContinuousAction::Pan);
const FILTER_INTENSITY: EditAction = EditAction::Continuous(ContinuousAction::FilterIntensity);
const ROTATE: EditAction = EditAction::Discrete(DiscreteAction::Rotate);
const FLIP: EditAction = EditAction::Discrete(DiscreteAction::Flip);
const CROP: EditAction = EditAction::Discrete(DiscreteAction::Crop);

/// Keys an edit session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Z,
    Escape,
    Other,
}

impl EditKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "z" | "Z" => EditKey::Z,
            "Escape" | "Esc" => EditKey::Escape,
            _ => EditKey::Other,
        }
    }
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: EditKey,
    /// Ctrl on most platforms, Cmd on macOS.
    pub modifier: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: EditKey) -> Self {
        Self {
            key,
            modifier: false,
            shift: false,
        }
    }

    pub fn with_modifier(mut self) -> Self {
        self.modifier = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Undo,
    Redo,
    CropDrawingCancelled,
    CropToolClosed,
    FiltersPanelClosed,
    /// The caller should leave the session without applying.
    CancelSession,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanDrag {
    /// Pointer position minus the pan at press time.
    anchor: Point,
    pan: Point,
}

/// Non-destructive edits of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    history: EditHistory,
    image_size: Size,
    viewport: Viewport,
    config: EditorConfig,
    crop_tool: bool,
    drawing_crop: Option<CropBox>,
    filters_panel: bool,
    pan_drag: Option<PanDrag>,
}

impl EditSession {
    /// Start a session for an image of `image_size` shown in `viewport`.
    ///
    /// The history holds the identity state with its zoom fitted to the
    /// viewport, when the viewport is measured.
    pub fn new(image_size: Size, viewport: Viewport, config: &EditorConfig) -> Self {
        let config = config.normalized();
        let mut session = Self {
            history: EditHistory::new(config.limits()),
            image_size,
            viewport,
            config,
            crop_tool: false,
            drawing_crop: None,
            filters_panel: false,
            pan_drag: None,
        };
        session.fit();
        session
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn current(&self) -> &EditState {
        self.history.current()
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_crop_tool_active(&self) -> bool {
        self.crop_tool
    }

    pub fn is_drawing_crop(&self) -> bool {
        self.drawing_crop.is_some()
    }

    pub fn is_filters_panel_open(&self) -> bool {
        self.filters_panel
    }

    pub fn is_panning(&self) -> bool {
        self.pan_drag.is_some()
    }

    /// Pan to draw with: the live drag value while dragging, the current
    /// entry's pan otherwise.
    pub fn preview_pan(&self) -> Point {
        self.pan_drag
            .map_or(self.current().edit_pan, |drag| drag.pan)
    }

    /// Screen rectangle of the transformed image in the preview.
    pub fn display_rect(&self) -> Rect {
        let state = self.current();
        let natural = state.transform().bounds(self.image_size);
        self.viewport
            .display_rect(natural, state.edit_zoom, self.preview_pan())
    }

    /// The crop being drawn, or else the committed one.
    pub fn crop_preview(&self) -> Option<CropBox> {
        self.drawing_crop.or(self.current().crop_box)
    }

    fn fit(&mut self) -> bool {
        match fit_zoom(self.viewport.size, self.image_size, false, self.config.fit_margin) {
            Some(zoom) => {
                self.history.fit_initial(zoom);
                true
            }
            None => false,
        }
    }

    /// Follow a container resize: refit the identity entry and point at it.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        self.pan_drag = None;
        self.fit()
    }

    fn record(&mut self, action: EditAction, patch: EditPatch) {
        self.history.push(action, patch);
    }

    /// Record a change to what the preview shows. A crop box is in screen
    /// space and only maps back under the view it was drawn in, so it is
    /// dropped.
    fn record_view(&mut self, action: EditAction, mut patch: EditPatch) {
        if self.current().crop_box.is_some() {
            log::debug!("edit: {} drops the crop box", action.key());
        }
        patch.crop_box = Some(None);
        self.record(action, patch);
    }

    pub fn rotate_right(&mut self) {
        let rotation = (self.current().rotation + 90).rem_euclid(360);
        self.record_view(ROTATE, EditPatch::rotation(rotation));
    }

    pub fn rotate_left(&mut self) {
        let rotation = (self.current().rotation - 90).rem_euclid(360);
        self.record_view(ROTATE, EditPatch::rotation(rotation));
    }

    pub fn flip(&mut self) {
        let scale_x = -self.current().scale_x;
        self.record_view(FLIP, EditPatch::scale_x(scale_x));
    }

    /// Straighten angle in degrees, clamped to the configured limit.
    pub fn straighten(&mut self, angle: f64) {
        self.record_view(STRAIGHTEN, EditPatch::straighten(angle));
    }

    fn zoom_to(&mut self, zoom: f64) -> bool {
        if self.crop_tool {
            return false;
        }
        self.record_view(ZOOM, EditPatch::zoom(zoom));
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_to(self.current().edit_zoom * self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_to(self.current().edit_zoom / self.config.zoom_step)
    }

    /// Wheel zoom; positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        self.zoom_to(self.current().edit_zoom * (1.0 - delta_y * self.config.wheel_sensitivity))
    }

    pub fn select_filter(&mut self, kind: FilterKind) {
        let filter = self.current().filter.select(kind);
        self.record(EditAction::select_filter(kind), EditPatch::filter(filter));
    }

    pub fn set_filter_intensity(&mut self, intensity: u8) {
        let filter = FilterState::new(self.current().filter.kind, intensity);
        self.record(FILTER_INTENSITY, EditPatch::filter(filter));
    }

    pub fn toggle_filters_panel(&mut self) {
        self.filters_panel = !self.filters_panel;
    }

    /// Start a pan drag at screen position `pointer`.
    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if self.crop_tool {
            return false;
        }
        let pan = self.current().edit_pan;
        self.pan_drag = Some(PanDrag {
            anchor: Point::new(pointer.x - pan.x, pointer.y - pan.y),
            pan,
        });
        true
    }

    pub fn move_pan(&mut self, pointer: Point) -> bool {
        match self.pan_drag.as_mut() {
            Some(drag) => {
                drag.pan = Point::new(pointer.x - drag.anchor.x, pointer.y - drag.anchor.y);
                true
            }
            None => false,
        }
    }

    /// Finish the drag, recording its pan when it moved.
    pub fn end_pan(&mut self) -> bool {
        let Some(drag) = self.pan_drag.take() else {
            return false;
        };
        if drag.pan == self.current().edit_pan {
            return false;
        }
        self.record_view(PAN, EditPatch::pan(drag.pan));
        true
    }

    /// Open or close the crop tool. Closing drops an unfinished drag.
    pub fn toggle_crop_tool(&mut self) {
        self.crop_tool = !self.crop_tool;
        self.drawing_crop = None;
        if self.crop_tool {
            self.pan_drag = None;
        }
    }

    pub fn crop_pointer_down(&mut self, pointer: Point) -> bool {
        if !self.crop_tool {
            return false;
        }
        self.drawing_crop = Some(CropBox::anchored(pointer));
        true
    }

    pub fn crop_pointer_move(&mut self, pointer: Point) -> bool {
        match self.drawing_crop.as_mut() {
            Some(crop) => {
                crop.drag_to(pointer);
                true
            }
            None => false,
        }
    }

    /// Commit the drawn crop box.
    pub fn crop_pointer_up(&mut self) -> bool {
        match self.drawing_crop.take() {
            Some(crop) => {
                self.record(CROP, EditPatch::crop(Some(crop)));
                true
            }
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        self.pan_drag = None;
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.pan_drag = None;
        self.history.redo()
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), HistoryError> {
        self.history.jump_to(index)?;
        self.pan_drag = None;
        Ok(())
    }

    /// Record the identity state and close the crop tool and filters panel.
    pub fn reset(&mut self) {
        self.pan_drag = None;
        self.crop_tool = false;
        self.drawing_crop = None;
        self.filters_panel = false;
        self.history.reset();
    }

    pub fn handle_key(&mut self, input: KeyInput) -> KeyOutcome {
        match input.key {
            EditKey::Z if input.modifier => {
                if input.shift {
                    self.redo();
                    KeyOutcome::Redo
                } else {
                    self.undo();
                    KeyOutcome::Undo
                }
            }
            EditKey::Escape => {
                if self.drawing_crop.take().is_some() {
                    KeyOutcome::CropDrawingCancelled
                } else if self.crop_tool {
                    self.crop_tool = false;
                    KeyOutcome::CropToolClosed
                } else if self.filters_panel {
                    self.filters_panel = false;
                    KeyOutcome::FiltersPanelClosed
                } else {
                    KeyOutcome::CancelSession
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Which region apply will render.
    pub fn source_region(&self) -> SourceRegion {
        if self.crop_tool && self.current().crop_box.is_some() {
            SourceRegion::Crop
        } else {
            SourceRegion::Viewport
        }
    }

    /// Render the current state of `image`.
    ///
    /// `Ok(None)` when the layout is not measured. The session is left
    /// untouched either way; closing it is up to the caller.
    pub fn apply(&self, image: &DecodedImage) -> Result<Option<DecodedImage>, ComposeError> {
        let state = self.current();
        let image_size = Size::from_pixels(image.width, image.height);
        let Some(rect) = resolve_source_rect(image_size, state, &self.viewport, self.source_region())
        else {
            log::warn!("edit: apply skipped, layout not measured");
            return Ok(None);
        };
        compose(image, state, rect, self.config.interpolation).map(Some)
    }
}
