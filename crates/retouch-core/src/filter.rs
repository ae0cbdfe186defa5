//! Stylistic color filters.
//!
//! Each filter is a chain of color-matrix primitives operating on RGB values
//! normalized to `[0, 1]`. Values are clamped after every primitive and alpha
//! passes through untouched.
//!
//! ## Primitives
//! - `grayscale(a)` and `sepia(a)`: blend toward the full effect by `a`
//! - `saturate(s)`: scale chroma around BT.709 luminance
//! - `contrast(c)`: `v' = (v - 0.5) * c + 0.5`
//! - `brightness(b)`: `v' = v * b`
//!
//! ## Filters
//! - `none`: identity
//! - `sepia`: `sepia(i)`
//! - `grayscale`: `grayscale(i)`
//! - `vintage`: `sepia(0.6 i)`, `contrast(1.1)`, `brightness(0.95)`, `saturate(1.2)`
//!
//! where `i = intensity / 100`.

use serde::{Deserialize, Serialize};

/// Upper bound of the intensity slider.
pub const MAX_INTENSITY: u8 = 100;

/// The selectable filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    None,
    Sepia,
    Grayscale,
    Vintage,
}

impl FilterKind {
    /// Intensity a freshly selected filter starts at.
    pub fn default_intensity(self) -> u8 {
        match self {
            FilterKind::Sepia => 80,
            FilterKind::None | FilterKind::Grayscale | FilterKind::Vintage => MAX_INTENSITY,
        }
    }
}

/// A filter type together with its strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Strength in percent (0 to 100).
    pub intensity: u8,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            kind: FilterKind::None,
            intensity: MAX_INTENSITY,
        }
    }
}

impl FilterState {
    pub fn new(kind: FilterKind, intensity: u8) -> Self {
        Self {
            kind,
            intensity: intensity.min(MAX_INTENSITY),
        }
    }

    /// The state after picking `kind` from the filter panel.
    ///
    /// Re-selecting the active type keeps its intensity; switching types
    /// starts at that type's default. Picking `None` always resets to 100.
    pub fn select(&self, kind: FilterKind) -> FilterState {
        if kind == self.kind && kind != FilterKind::None {
            *self
        } else {
            FilterState::new(kind, kind.default_intensity())
        }
    }

    /// True when applying the filter cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        self.kind == FilterKind::None
            || (self.intensity == 0 && self.kind != FilterKind::Vintage)
    }

    /// Filter one straight-alpha RGBA pixel.
    pub fn apply_pixel(&self, rgba: [u8; 4]) -> [u8; 4] {
        if self.is_identity() {
            return rgba;
        }

        let amount = self.intensity.min(MAX_INTENSITY) as f32 / 100.0;
        let mut rgb = [
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
        ];

        match self.kind {
            FilterKind::None => {}
            FilterKind::Sepia => rgb = sepia(rgb, amount),
            FilterKind::Grayscale => rgb = grayscale(rgb, amount),
            FilterKind::Vintage => {
                rgb = sepia(rgb, amount * 0.6);
                rgb = contrast(rgb, 1.1);
                rgb = brightness(rgb, 0.95);
                rgb = saturate(rgb, 1.2);
            }
        }

        [to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]), rgba[3]]
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Multiply by a 3x3 color matrix and clamp.
#[inline]
fn mat3(m: [[f32; 3]; 3], [r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
        (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
        (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
    ]
}

/// `grayscale(a)`, `a` in `[0, 1]`.
#[inline]
fn grayscale(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    mat3(
        [
            [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
            [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
            [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
        ],
        rgb,
    )
}

/// `sepia(a)`, `a` in `[0, 1]`.
#[inline]
fn sepia(rgb: [f32; 3], amount: f32) -> [f32; 3] {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    mat3(
        [
            [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
            [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
            [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
        ],
        rgb,
    )
}

/// `saturate(s)`; `s > 1` oversaturates.
#[inline]
fn saturate(rgb: [f32; 3], s: f32) -> [f32; 3] {
    mat3(
        [
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ],
        rgb,
    )
}

#[inline]
fn contrast([r, g, b]: [f32; 3], c: f32) -> [f32; 3] {
    let f = |v: f32| ((v - 0.5) * c + 0.5).clamp(0.0, 1.0);
    [f(r), f(g), f(b)]
}

#[inline]
fn brightness([r, g, b]: [f32; 3], k: f32) -> [f32; 3] {
    let f = |v: f32| (v * k).clamp(0.0, 1.0);
    [f(r), f(g), f(b)]
}
