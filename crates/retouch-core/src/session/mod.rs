//! Editor modes and the workspace that owns them.
//!
//! The workspace is in exactly one [`Mode`] at a time. Entering a mode
//! replaces the previous one, so an edit session and a mask session never
//! coexist:
//!
//! - `Viewing`: plain zoom and pan of the current image
//! - `Editing`: an [`EditSession`] with its own history, zoom and pan
//! - `Masking`: a [`MaskSession`] painted over the viewed image

mod edit;
mod mask;

pub use edit::{EditKey, EditSession, KeyInput, KeyOutcome};
pub use mask::MaskSession;

use crate::backend::{self, BackendError, BackendOutput, BackendRequest, GenerativeBackend, QuotaCooldown};
use crate::compose::ComposeError;
use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_image, EncodeError, ExportFormat};
use crate::geometry::{fit_to_height, fit_zoom, Point, Rect, Size, Viewport};
use crate::matting::remove_background;

/// What the workspace is doing with its image.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Viewing,
    Editing(EditSession),
    Masking(MaskSession),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Viewing => "viewing",
            Mode::Editing(_) => "editing",
            Mode::Masking(_) => "masking",
        }
    }
}

/// The current image, how it is viewed, and the active mode.
#[derive(Debug, Clone)]
pub struct Workspace {
    config: EditorConfig,
    image: Option<DecodedImage>,
    viewport: Viewport,
    zoom: f64,
    pan: Point,
    side_by_side: bool,
    /// Pointer minus pan at press time, while a viewing pan drag is active.
    pan_anchor: Option<Point>,
    mode: Mode,
    cooldown: QuotaCooldown,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Workspace {
    pub fn new(config: EditorConfig) -> Self {
        let config = config.normalized();
        let cooldown = QuotaCooldown::new(config.quota_cooldown_secs);
        Self {
            config,
            image: None,
            viewport: Viewport::default(),
            zoom: 1.0,
            pan: Point::ORIGIN,
            side_by_side: false,
            pan_anchor: None,
            mode: Mode::Viewing,
            cooldown,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect for sessions started later;
    /// a running quota cooldown keeps going.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config.normalized();
        self.cooldown.set_duration(self.config.quota_cooldown_secs);
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        match &self.mode {
            Mode::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn edit_session_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.mode {
            Mode::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn mask_session(&self) -> Option<&MaskSession> {
        match &self.mode {
            Mode::Masking(session) => Some(session),
            _ => None,
        }
    }

    pub fn mask_session_mut(&mut self) -> Option<&mut MaskSession> {
        match &mut self.mode {
            Mode::Masking(session) => Some(session),
            _ => None,
        }
    }

    /// Viewing zoom. Edit sessions keep their own.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn image_size(&self) -> Option<Size> {
        self.image
            .as_ref()
            .map(|image| Size::from_pixels(image.width, image.height))
    }

    fn set_mode(&mut self, mode: Mode) {
        log::debug!("workspace: {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.pan_anchor = None;
    }

    /// Decode `bytes` and make them the current image.
    ///
    /// On failure nothing changes.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let image = decode_image(bytes)?;
        self.set_image(image);
        Ok(())
    }

    /// Make `image` current, leave any session and fit it to the viewport.
    pub fn set_image(&mut self, image: DecodedImage) {
        log::info!("workspace: image {}x{}", image.width, image.height);
        self.image = Some(image);
        self.set_mode(Mode::Viewing);
        self.fit_all();
    }

    /// Follow a container resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        match &mut self.mode {
            Mode::Editing(session) => {
                session.set_viewport(viewport);
            }
            _ => {
                self.fit_all();
            }
        }
    }

    /// Show before and after next to each other. Only affects viewing fits.
    pub fn set_side_by_side(&mut self, side_by_side: bool) {
        self.side_by_side = side_by_side;
        self.fit_all();
    }

    fn apply_fit(&mut self, zoom: Option<f64>) -> bool {
        match zoom {
            Some(zoom) => {
                self.zoom = zoom;
                self.pan = Point::ORIGIN;
                true
            }
            None => false,
        }
    }

    /// Fit the whole image into the viewport.
    ///
    /// Without an image the view resets to zoom 1. An unmeasured viewport
    /// leaves zoom and pan untouched and returns false.
    pub fn fit_all(&mut self) -> bool {
        let Some(size) = self.image_size() else {
            return self.apply_fit(Some(1.0));
        };
        let side_by_side = self.side_by_side && matches!(self.mode, Mode::Viewing);
        self.apply_fit(fit_zoom(self.viewport.size, size, side_by_side, self.config.fit_margin))
    }

    /// Fit the image height to the viewport height.
    pub fn fit_to_height(&mut self) -> bool {
        let Some(size) = self.image_size() else {
            return self.apply_fit(Some(1.0));
        };
        self.apply_fit(fit_to_height(self.viewport.size, size))
    }

    fn set_viewing_zoom(&mut self, zoom: f64) -> bool {
        let zoom = self.config.limits().clamp_zoom(zoom);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        match &mut self.mode {
            Mode::Editing(session) => session.zoom_in(),
            _ => self.set_viewing_zoom(self.zoom * self.config.zoom_step),
        }
    }

    pub fn zoom_out(&mut self) -> bool {
        match &mut self.mode {
            Mode::Editing(session) => session.zoom_out(),
            _ => self.set_viewing_zoom(self.zoom / self.config.zoom_step),
        }
    }

    /// Wheel zoom. Ignored while masking.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if self.image.is_none() || !delta_y.is_finite() {
            return false;
        }
        match &mut self.mode {
            Mode::Editing(session) => session.wheel(delta_y),
            Mode::Masking(_) => false,
            Mode::Viewing => {
                self.set_viewing_zoom(self.zoom * (1.0 - delta_y * self.config.wheel_sensitivity))
            }
        }
    }

    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if self.image.is_none() {
            return false;
        }
        match &mut self.mode {
            Mode::Editing(session) => session.begin_pan(pointer),
            Mode::Masking(_) => false,
            Mode::Viewing => {
                self.pan_anchor = Some(Point::new(pointer.x - self.pan.x, pointer.y - self.pan.y));
                true
            }
        }
    }

    pub fn move_pan(&mut self, pointer: Point) -> bool {
        match &mut self.mode {
            Mode::Editing(session) => session.move_pan(pointer),
            Mode::Masking(_) => false,
            Mode::Viewing => match self.pan_anchor {
                Some(anchor) => {
                    self.pan = Point::new(pointer.x - anchor.x, pointer.y - anchor.y);
                    true
                }
                None => false,
            },
        }
    }

    pub fn end_pan(&mut self) -> bool {
        match &mut self.mode {
            Mode::Editing(session) => session.end_pan(),
            Mode::Masking(_) => false,
            Mode::Viewing => self.pan_anchor.take().is_some(),
        }
    }

    /// Start editing the current image. False without an image.
    pub fn enter_edit(&mut self) -> bool {
        let Some(size) = self.image_size() else {
            return false;
        };
        let session = EditSession::new(size, self.viewport, &self.config);
        self.set_mode(Mode::Editing(session));
        true
    }

    /// Start painting a mask over the current image. False without an
    /// image.
    pub fn enter_mask(&mut self) -> bool {
        let Some(image) = &self.image else {
            return false;
        };
        let session = MaskSession::new(image.width, image.height, self.config.brush_size);
        self.set_mode(Mode::Masking(session));
        self.fit_all();
        true
    }

    /// Leave any session without applying it.
    pub fn cancel(&mut self) {
        if matches!(self.mode, Mode::Viewing) {
            return;
        }
        self.set_mode(Mode::Viewing);
        self.fit_all();
    }

    /// Route a key press to the edit session. Escape past the last open
    /// tool cancels the session.
    pub fn handle_key(&mut self, input: KeyInput) -> KeyOutcome {
        let Mode::Editing(session) = &mut self.mode else {
            return KeyOutcome::Ignored;
        };
        let outcome = session.handle_key(input);
        if outcome == KeyOutcome::CancelSession {
            self.cancel();
        }
        outcome
    }

    /// Render the edit session into a new current image and go back to
    /// viewing.
    ///
    /// Returns false when not editing or when the layout is not measured.
    /// On error the session stays open.
    pub fn apply_edit(&mut self) -> Result<bool, ComposeError> {
        let (Mode::Editing(session), Some(image)) = (&self.mode, &self.image) else {
            return Ok(false);
        };
        let Some(output) = session.apply(image)? else {
            return Ok(false);
        };
        self.set_image(output);
        Ok(true)
    }

    /// Key out the sampled background of the current image.
    pub fn remove_background(&mut self) -> bool {
        if !matches!(self.mode, Mode::Viewing) {
            return false;
        }
        let Some(image) = &self.image else {
            return false;
        };
        let output = remove_background(image, self.config.tolerance);
        self.image = Some(output);
        true
    }

    /// Start a mask stroke at a screen position, given the screen
    /// rectangle the mask is displayed in.
    pub fn mask_pointer_down(&mut self, client: Point, element: Rect) -> bool {
        let Mode::Masking(session) = &mut self.mode else {
            return false;
        };
        match session.to_mask_coords(client, element) {
            Some(at) => {
                session.pointer_down(at);
                true
            }
            None => false,
        }
    }

    pub fn mask_pointer_move(&mut self, client: Point, element: Rect) -> bool {
        let zoom = self.zoom;
        let Mode::Masking(session) = &mut self.mode else {
            return false;
        };
        match session.to_mask_coords(client, element) {
            Some(at) => session.pointer_move(at, zoom),
            None => false,
        }
    }

    pub fn mask_pointer_up(&mut self) {
        if let Mode::Masking(session) = &mut self.mode {
            session.pointer_up();
        }
    }

    /// A backend request for the current image.
    pub fn request(&self, instructions: &str) -> Result<Option<BackendRequest>, BackendError> {
        let Some(image) = &self.image else {
            return Ok(None);
        };
        BackendRequest::new(image, ExportFormat::Png, instructions).map(Some)
    }

    /// A backend request carrying the painted mask. Clears the mask once
    /// the request is built.
    pub fn mask_request(&mut self, instructions: &str) -> Result<Option<BackendRequest>, BackendError> {
        let (Mode::Masking(session), Some(image)) = (&mut self.mode, &self.image) else {
            return Ok(None);
        };
        let request = BackendRequest::new(image, ExportFormat::Png, instructions)?
            .with_mask(session.raster())?;
        session.clear();
        Ok(Some(request))
    }

    /// Send `request` through `backend`, honouring the quota cooldown.
    pub fn submit<B>(
        &mut self,
        backend: &mut B,
        request: &BackendRequest,
        now_ms: f64,
    ) -> Result<BackendOutput, BackendError>
    where
        B: GenerativeBackend + ?Sized,
    {
        backend::submit(backend, request, &mut self.cooldown, now_ms)
    }

    pub fn cooldown_remaining_secs(&self, now_ms: f64) -> u32 {
        self.cooldown.remaining_secs(now_ms)
    }

    /// Gate for hosts that drive the backend call themselves.
    pub fn check_cooldown(&mut self, now_ms: f64) -> Result<(), BackendError> {
        if self.cooldown.is_active(now_ms) {
            return Err(BackendError::CoolingDown {
                remaining_secs: self.cooldown.remaining_secs(now_ms),
            });
        }
        Ok(())
    }

    /// Classify a failure reported by a host-driven backend call, starting
    /// the cooldown on quota errors.
    pub fn report_backend_failure(&mut self, message: &str, now_ms: f64) -> BackendError {
        let err = BackendError::from_message(message);
        log::warn!("workspace: backend failed: {err}");
        if err.is_quota() {
            self.cooldown.start(now_ms);
        }
        err
    }

    /// Encode the current image for download.
    pub fn export(&self, format: ExportFormat, comment: Option<&str>) -> Result<Option<Vec<u8>>, EncodeError> {
        let Some(image) = &self.image else {
            return Ok(None);
        };
        let bytes = encode_image(image, format, comment)?;
        log::info!("workspace: exported {} bytes as {}", bytes.len(), format.mime_type());
        Ok(Some(bytes))
    }
}
