//! Edit history: a pointer into a list of complete edit snapshots.
//!
//! Every entry is a full [`EditState`], so undo, redo and jumps are pure
//! pointer moves. Entry 0 is the identity state the session started from and
//! is never removed.
//!
//! ## Coalescing
//!
//! Pushing a [`EditAction::Continuous`] action right after an entry produced
//! by the same continuous action replaces that entry instead of appending,
//! so a slider drag leaves a single undo step. Every push first drops the
//! redo-able future beyond the pointer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditLimits;
use crate::filter::{FilterKind, FilterState, MAX_INTENSITY};
use crate::geometry::{composed_angle_degrees, CropBox, Point};
use crate::transform::TransformParams;

/// Errors for history operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A jump addressed an entry that does not exist.
    #[error("History index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// An action key that no action maps to.
    #[error("Unknown edit action: {0}")]
    UnknownAction(String),
}

/// Gestures that may fire many times in a row and coalesce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContinuousAction {
    Zoom,
    Straighten,
    Pan,
    FilterIntensity,
}

/// One-shot edits; each always gets its own entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteAction {
    Initial,
    Rotate,
    Flip,
    Crop,
    Reset,
    FilterNone,
    FilterSepia,
    FilterGrayscale,
    FilterVintage,
}

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EditAction {
    Continuous(ContinuousAction),
    Discrete(DiscreteAction),
}

const ACTION_KEYS: [(EditAction, &str); 13] = [
    (EditAction::Discrete(DiscreteAction::Initial), "initialState"),
    (EditAction::Discrete(DiscreteAction::Rotate), "actionRotate"),
    (EditAction::Discrete(DiscreteAction::Flip), "actionFlip"),
    (EditAction::Discrete(DiscreteAction::Crop), "actionCrop"),
    (EditAction::Discrete(DiscreteAction::Reset), "actionReset"),
    (EditAction::Discrete(DiscreteAction::FilterNone), "filterNone"),
    (EditAction::Discrete(DiscreteAction::FilterSepia), "filterSepia"),
    (EditAction::Discrete(DiscreteAction::FilterGrayscale), "filterGrayscale"),
    (EditAction::Discrete(DiscreteAction::FilterVintage), "filterVintage"),
    (EditAction::Continuous(ContinuousAction::Zoom), "actionZoom"),
    (EditAction::Continuous(ContinuousAction::Straighten), "actionStraighten"),
    (EditAction::Continuous(ContinuousAction::Pan), "actionPan"),
    (EditAction::Continuous(ContinuousAction::FilterIntensity), "actionFilter"),
];

impl EditAction {
    pub const INITIAL: EditAction = EditAction::Discrete(DiscreteAction::Initial);

    /// Whether an entry made by `self` absorbs a following push of `next`.
    pub fn coalesces_with(self, next: EditAction) -> bool {
        match (self, next) {
            (EditAction::Continuous(a), EditAction::Continuous(b)) => a == b,
            (EditAction::Continuous(_), EditAction::Discrete(_))
            | (EditAction::Discrete(_), _) => false,
        }
    }

    /// Stable key, used by hosts to look up a localized history label.
    pub fn key(self) -> &'static str {
        ACTION_KEYS
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, key)| *key)
            .unwrap_or("unknown")
    }

    pub fn from_key(key: &str) -> Option<EditAction> {
        ACTION_KEYS
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(action, _)| *action)
    }

    /// The discrete action that selects a filter type.
    pub fn select_filter(kind: FilterKind) -> EditAction {
        EditAction::Discrete(match kind {
            FilterKind::None => DiscreteAction::FilterNone,
            FilterKind::Sepia => DiscreteAction::FilterSepia,
            FilterKind::Grayscale => DiscreteAction::FilterGrayscale,
            FilterKind::Vintage => DiscreteAction::FilterVintage,
        })
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<EditAction> for &'static str {
    fn from(action: EditAction) -> Self {
        action.key()
    }
}

impl TryFrom<String> for EditAction {
    type Error = HistoryError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        EditAction::from_key(&key).ok_or(HistoryError::UnknownAction(key))
    }
}

/// One complete snapshot of the edit parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditState {
    #[serde(rename = "actionKey")]
    pub action: EditAction,
    /// Degrees, a multiple of 90 in `[0, 360)`.
    pub rotation: i32,
    /// `1.0`, or `-1.0` when flipped.
    pub scale_x: f64,
    pub straighten_angle: f64,
    pub edit_zoom: f64,
    pub edit_pan: Point,
    /// Crop drawn on screen against this entry's zoom and pan.
    pub crop_box: Option<CropBox>,
    pub filter: FilterState,
}

impl Default for EditState {
    fn default() -> Self {
        Self::identity()
    }
}

impl EditState {
    /// The untouched state every session starts from.
    pub fn identity() -> Self {
        Self {
            action: EditAction::INITIAL,
            rotation: 0,
            scale_x: 1.0,
            straighten_angle: 0.0,
            edit_zoom: 1.0,
            edit_pan: Point::ORIGIN,
            crop_box: None,
            filter: FilterState::default(),
        }
    }

    pub fn angle_degrees(&self) -> f64 {
        composed_angle_degrees(self.rotation, self.straighten_angle)
    }

    pub fn transform(&self) -> TransformParams {
        TransformParams::new(self.angle_degrees(), self.scale_x)
    }

    /// Bring every field into its valid range.
    fn normalized(mut self, limits: &EditLimits) -> Self {
        self.rotation = self.rotation.rem_euclid(360);
        self.scale_x = if self.scale_x < 0.0 { -1.0 } else { 1.0 };
        self.straighten_angle = limits.clamp_straighten(self.straighten_angle);
        self.edit_zoom = limits.clamp_zoom(self.edit_zoom);
        if !(self.edit_pan.x.is_finite() && self.edit_pan.y.is_finite()) {
            self.edit_pan = Point::ORIGIN;
        }
        self.filter.intensity = self.filter.intensity.min(MAX_INTENSITY);
        self
    }
}

/// A partial update merged over the current state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditPatch {
    pub rotation: Option<i32>,
    pub scale_x: Option<f64>,
    pub straighten_angle: Option<f64>,
    pub edit_zoom: Option<f64>,
    pub edit_pan: Option<Point>,
    pub crop_box: Option<Option<CropBox>>,
    pub filter: Option<FilterState>,
}

impl EditPatch {
    pub fn rotation(rotation: i32) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn scale_x(scale_x: f64) -> Self {
        Self {
            scale_x: Some(scale_x),
            ..Self::default()
        }
    }

    pub fn straighten(angle: f64) -> Self {
        Self {
            straighten_angle: Some(angle),
            ..Self::default()
        }
    }

    pub fn zoom(zoom: f64) -> Self {
        Self {
            edit_zoom: Some(zoom),
            ..Self::default()
        }
    }

    pub fn pan(pan: Point) -> Self {
        Self {
            edit_pan: Some(pan),
            ..Self::default()
        }
    }

    pub fn crop(crop: Option<CropBox>) -> Self {
        Self {
            crop_box: Some(crop),
            ..Self::default()
        }
    }

    pub fn filter(filter: FilterState) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Every field of `state`.
    pub fn full(state: &EditState) -> Self {
        Self {
            rotation: Some(state.rotation),
            scale_x: Some(state.scale_x),
            straighten_angle: Some(state.straighten_angle),
            edit_zoom: Some(state.edit_zoom),
            edit_pan: Some(state.edit_pan),
            crop_box: Some(state.crop_box),
            filter: Some(state.filter),
        }
    }

    fn apply_to(&self, base: &EditState, action: EditAction) -> EditState {
        EditState {
            action,
            rotation: self.rotation.unwrap_or(base.rotation),
            scale_x: self.scale_x.unwrap_or(base.scale_x),
            straighten_angle: self.straighten_angle.unwrap_or(base.straighten_angle),
            edit_zoom: self.edit_zoom.unwrap_or(base.edit_zoom),
            edit_pan: self.edit_pan.unwrap_or(base.edit_pan),
            crop_box: self.crop_box.unwrap_or(base.crop_box),
            filter: self.filter.unwrap_or(base.filter),
        }
    }
}

/// What a push did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The current entry was updated in place.
    Coalesced,
    /// A new entry was appended after dropping `truncated` redo entries.
    Appended { truncated: usize },
}

/// Linear undo/redo timeline of edit snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct EditHistory {
    entries: Vec<EditState>,
    index: usize,
    limits: EditLimits,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(EditLimits::default())
    }
}

impl EditHistory {
    /// A history holding only the identity state.
    pub fn new(limits: EditLimits) -> Self {
        Self::with_initial(EditState::identity(), limits)
    }

    /// A history seeded with `initial`, normalized into `limits`.
    pub fn with_initial(initial: EditState, limits: EditLimits) -> Self {
        Self {
            entries: vec![initial.normalized(&limits)],
            index: 0,
            limits,
        }
    }

    pub fn current(&self) -> &EditState {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[EditState] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the identity entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limits(&self) -> &EditLimits {
        &self.limits
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Record an edit.
    ///
    /// The future beyond the pointer is dropped first. A continuous action
    /// repeating the current entry's action then replaces that entry;
    /// anything else is appended and becomes current.
    pub fn push(&mut self, action: EditAction, patch: EditPatch) -> PushOutcome {
        let truncated = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);

        let last = &self.entries[self.index];
        let next = patch.apply_to(last, action).normalized(&self.limits);

        if last.action.coalesces_with(action) {
            self.entries[self.index] = next;
            log::debug!("history: coalesced {action} at {}", self.index);
            return PushOutcome::Coalesced;
        }

        self.entries.push(next);
        self.index = self.entries.len() - 1;
        if truncated > 0 {
            log::debug!("history: dropped {truncated} redo entries");
        }
        log::debug!("history: pushed {action} at {}", self.index);
        PushOutcome::Appended { truncated }
    }

    /// Step back one entry. Returns false at the start.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one entry. Returns false at the end.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Push the identity parameters as a discrete reset entry.
    pub fn reset(&mut self) -> PushOutcome {
        self.push(
            EditAction::Discrete(DiscreteAction::Reset),
            EditPatch::full(&EditState::identity()),
        )
    }

    /// Point at entry `index`.
    pub fn jump_to(&mut self, index: usize) -> Result<(), HistoryError> {
        if index >= self.entries.len() {
            log::warn!(
                "history: rejected jump to {index} (length {})",
                self.entries.len()
            );
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Set the identity entry's zoom, center it and point at it.
    ///
    /// Used when the session starts and whenever the container is resized.
    /// Entries after the first are kept and stay reachable through redo.
    pub fn fit_initial(&mut self, zoom: f64) {
        let limits = self.limits;
        let first = &mut self.entries[0];
        first.edit_zoom = limits.clamp_zoom(zoom);
        first.edit_pan = Point::ORIGIN;
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZOOM: EditAction = EditAction::Continuous(ContinuousAction::Zoom);
    const PAN: EditAction = EditAction::Continuous(ContinuousAction::Pan);
    const ROTATE: EditAction = EditAction::Discrete(DiscreteAction::Rotate);
    const FLIP: EditAction = EditAction::Discrete(DiscreteAction::Flip);

    #[test]
    fn test_new_history_holds_identity() {
        let history = EditHistory::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current(), &EditState::identity());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_empty());
    }

    #[test]
    fn test_continuous_push_coalesces() {
        let mut history = EditHistory::default();
        assert_eq!(history.push(ZOOM, EditPatch::zoom(1.5)), PushOutcome::Appended { truncated: 0 });
        assert_eq!(history.push(ZOOM, EditPatch::zoom(2.5)), PushOutcome::Coalesced);

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().edit_zoom, 2.5);
    }

    #[test]
    fn test_different_continuous_actions_do_not_coalesce() {
        let mut history = EditHistory::default();
        history.push(ZOOM, EditPatch::zoom(1.5));
        history.push(PAN, EditPatch::pan(Point::new(3.0, 4.0)));
        history.push(ZOOM, EditPatch::zoom(2.0));
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_discrete_pushes_never_coalesce() {
        let mut history = EditHistory::default();
        history.push(ROTATE, EditPatch::rotation(90));
        history.push(ROTATE, EditPatch::rotation(180));
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().rotation, 180);
    }

    #[test]
    fn test_truncation_on_branch() {
        let mut history = EditHistory::default();
        history.push(ROTATE, EditPatch::rotation(90)); // B
        history.push(FLIP, EditPatch::scale_x(-1.0)); // C
        assert_eq!(history.index(), 2);

        assert!(history.undo());
        assert_eq!(history.index(), 1);

        let outcome = history.push(ROTATE, EditPatch::rotation(180)); // D
        assert_eq!(outcome, PushOutcome::Appended { truncated: 1 });
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current().rotation, 180);
        assert_eq!(history.current().scale_x, 1.0);
        assert!(!history.redo());
    }

    #[test]
    fn test_coalescing_after_undo_also_drops_future() {
        let mut history = EditHistory::default();
        history.push(ZOOM, EditPatch::zoom(2.0));
        history.push(ROTATE, EditPatch::rotation(90));
        history.undo();

        assert_eq!(history.push(ZOOM, EditPatch::zoom(3.0)), PushOutcome::Coalesced);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().edit_zoom, 3.0);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut history = EditHistory::default();
        assert!(!history.undo());
        history.push(ROTATE, EditPatch::rotation(90));
        assert!(!history.redo());
        assert!(history.undo());
        assert!(!history.undo());
        assert!(history.redo());
        assert_eq!(history.current().rotation, 90);
    }

    #[test]
    fn test_reset_pushes_identity_entry() {
        let mut history = EditHistory::default();
        history.push(ROTATE, EditPatch::rotation(270));
        history.push(ZOOM, EditPatch::zoom(4.0));
        history.reset();

        let current = history.current();
        assert_eq!(history.len(), 4);
        assert_eq!(current.action, EditAction::Discrete(DiscreteAction::Reset));
        assert_eq!(current.rotation, 0);
        assert_eq!(current.edit_zoom, 1.0);

        history.undo();
        assert_eq!(history.current().edit_zoom, 4.0);
    }

    #[test]
    fn test_jump_to_validates_index() {
        let mut history = EditHistory::default();
        history.push(ROTATE, EditPatch::rotation(90));
        history.push(ROTATE, EditPatch::rotation(180));

        assert!(history.jump_to(0).is_ok());
        assert_eq!(history.current(), &EditState::identity());
        assert_eq!(
            history.jump_to(3),
            Err(HistoryError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_push_normalizes_values() {
        let mut history = EditHistory::default();
        history.push(ROTATE, EditPatch::rotation(-90));
        assert_eq!(history.current().rotation, 270);

        history.push(EditAction::Continuous(ContinuousAction::Straighten), EditPatch::straighten(40.0));
        assert_eq!(history.current().straighten_angle, 15.0);

        history.push(ZOOM, EditPatch::zoom(100.0));
        assert_eq!(history.current().edit_zoom, 10.0);

        history.push(FLIP, EditPatch::scale_x(-3.0));
        assert_eq!(history.current().scale_x, -1.0);
    }

    #[test]
    fn test_fit_initial_moves_pointer_to_first_entry() {
        let mut history = EditHistory::default();
        history.push(PAN, EditPatch::pan(Point::new(5.0, 5.0)));
        history.fit_initial(0.42);

        assert_eq!(history.index(), 0);
        assert_eq!(history.current().edit_zoom, 0.42);
        assert_eq!(history.current().edit_pan, Point::ORIGIN);
        assert!(history.can_redo());
    }

    #[test]
    fn test_action_keys_round_trip() {
        for (action, key) in ACTION_KEYS {
            assert_eq!(action.key(), key);
            assert_eq!(EditAction::from_key(key), Some(action));
        }
        assert_eq!(EditAction::from_key("actionTeleport"), None);
    }

    #[test]
    fn test_coalescing_rule_is_exhaustive() {
        let zoom = EditAction::Continuous(ContinuousAction::Zoom);
        let filter = EditAction::Continuous(ContinuousAction::FilterIntensity);
        assert!(zoom.coalesces_with(zoom));
        assert!(!zoom.coalesces_with(filter));
        assert!(!ROTATE.coalesces_with(ROTATE));
        assert!(!EditAction::INITIAL.coalesces_with(zoom));
    }

    #[test]
    fn test_select_filter_actions() {
        assert_eq!(
            EditAction::select_filter(FilterKind::Sepia),
            EditAction::Discrete(DiscreteAction::FilterSepia)
        );
        assert_eq!(EditAction::select_filter(FilterKind::None).key(), "filterNone");
    }
}
