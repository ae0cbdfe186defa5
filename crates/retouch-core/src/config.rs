//! Editor configuration and its defaults.
//!
//! Every tunable of the edit pipeline lives in [`EditorConfig`]. Hosts pass
//! it as a partial object; missing fields take the defaults below and
//! out-of-range values are clamped by [`EditorConfig::normalized`].

use serde::{Deserialize, Serialize};

use crate::transform::InterpolationFilter;

// ==========================================================================
// Brush
// ==========================================================================

/// Default mask brush diameter in display pixels.
pub const DEFAULT_BRUSH_SIZE: f64 = 40.0;

/// Smallest brush the slider offers.
pub const MIN_BRUSH_SIZE: f64 = 5.0;

/// Largest brush the slider offers. Not enforced: hosts may go higher.
pub const MAX_BRUSH_SIZE: f64 = 150.0;

// ==========================================================================
// Matting
// ==========================================================================

/// Default chroma-key tolerance, in RGB distance units.
pub const DEFAULT_TOLERANCE: f64 = 20.0;

pub const MIN_TOLERANCE: f64 = 0.0;

pub const MAX_TOLERANCE: f64 = 100.0;

// ==========================================================================
// Geometry
// ==========================================================================

/// Straighten slider bound, in degrees either side of zero.
pub const DEFAULT_STRAIGHTEN_LIMIT: f64 = 15.0;

/// Largest straighten bound a config may ask for.
pub const MAX_STRAIGHTEN_LIMIT: f64 = 45.0;

pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Multiplier of one zoom-in button press.
pub const DEFAULT_ZOOM_STEP: f64 = 1.1;

/// Zoom change per wheel delta unit.
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 0.01;

/// Share of the container a fitted image fills.
pub const DEFAULT_FIT_MARGIN: f64 = 0.95;

// ==========================================================================
// Export and backend
// ==========================================================================

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Cooldown after a quota failure from the generative backend.
pub const DEFAULT_QUOTA_COOLDOWN_SECS: u32 = 60;

/// Longest cooldown a config may ask for.
pub const MAX_QUOTA_COOLDOWN_SECS: u32 = 3600;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_BRUSH_SIZE > 0.0);
    assert!(DEFAULT_BRUSH_SIZE >= MIN_BRUSH_SIZE);
    assert!(DEFAULT_BRUSH_SIZE <= MAX_BRUSH_SIZE);

    assert!(DEFAULT_TOLERANCE >= MIN_TOLERANCE);
    assert!(DEFAULT_TOLERANCE <= MAX_TOLERANCE);

    assert!(DEFAULT_STRAIGHTEN_LIMIT > 0.0);
    assert!(DEFAULT_STRAIGHTEN_LIMIT <= MAX_STRAIGHTEN_LIMIT);

    assert!(DEFAULT_MIN_ZOOM > 0.0);
    assert!(DEFAULT_MAX_ZOOM > DEFAULT_MIN_ZOOM);
    assert!(DEFAULT_ZOOM_STEP > 1.0);
    assert!(DEFAULT_FIT_MARGIN > 0.0 && DEFAULT_FIT_MARGIN <= 1.0);

    assert!(DEFAULT_JPEG_QUALITY >= 1 && DEFAULT_JPEG_QUALITY <= 100);
    assert!(DEFAULT_QUOTA_COOLDOWN_SECS <= MAX_QUOTA_COOLDOWN_SECS);
};

/// Bounds a history entry is normalized into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditLimits {
    pub straighten_limit: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EditLimits {
    fn default() -> Self {
        Self {
            straighten_limit: DEFAULT_STRAIGHTEN_LIMIT,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl EditLimits {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn clamp_straighten(&self, angle: f64) -> f64 {
        if angle.is_nan() {
            return 0.0;
        }
        angle.clamp(-self.straighten_limit, self.straighten_limit)
    }
}

/// Tunables for the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub brush_size: f64,
    pub tolerance: f64,
    pub straighten_limit: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub wheel_sensitivity: f64,
    pub fit_margin: f64,
    pub jpeg_quality: u8,
    pub quota_cooldown_secs: u32,
    /// Resampling used when rendering a straightened image at apply time.
    pub interpolation: InterpolationFilter,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush_size: DEFAULT_BRUSH_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            straighten_limit: DEFAULT_STRAIGHTEN_LIMIT,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            fit_margin: DEFAULT_FIT_MARGIN,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            quota_cooldown_secs: DEFAULT_QUOTA_COOLDOWN_SECS,
            interpolation: InterpolationFilter::default(),
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl EditorConfig {
    /// A copy with every value brought into its valid range.
    pub fn normalized(&self) -> Self {
        let min_zoom = finite_or(self.min_zoom, DEFAULT_MIN_ZOOM).max(f64::EPSILON);
        let max_zoom = finite_or(self.max_zoom, DEFAULT_MAX_ZOOM).max(min_zoom);
        let zoom_step = finite_or(self.zoom_step, DEFAULT_ZOOM_STEP);
        let fit_margin = finite_or(self.fit_margin, DEFAULT_FIT_MARGIN);

        Self {
            brush_size: finite_or(self.brush_size, DEFAULT_BRUSH_SIZE).max(1.0),
            tolerance: finite_or(self.tolerance, DEFAULT_TOLERANCE).clamp(MIN_TOLERANCE, MAX_TOLERANCE),
            straighten_limit: finite_or(self.straighten_limit, DEFAULT_STRAIGHTEN_LIMIT)
                .clamp(0.0, MAX_STRAIGHTEN_LIMIT),
            min_zoom,
            max_zoom,
            zoom_step: if zoom_step > 1.0 { zoom_step } else { DEFAULT_ZOOM_STEP },
            wheel_sensitivity: finite_or(self.wheel_sensitivity, DEFAULT_WHEEL_SENSITIVITY).max(0.0),
            fit_margin: if fit_margin > 0.0 && fit_margin <= 1.0 {
                fit_margin
            } else {
                DEFAULT_FIT_MARGIN
            },
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            quota_cooldown_secs: self.quota_cooldown_secs.min(MAX_QUOTA_COOLDOWN_SECS),
            interpolation: self.interpolation,
        }
    }

    pub fn limits(&self) -> EditLimits {
        EditLimits {
            straighten_limit: self.straighten_limit,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
        }
    }
}
