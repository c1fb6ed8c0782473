//! Display registry and coordinate mapping.
//!
//! The registry owns the active display state. Writers go through
//! [`DisplayRegistry::initialize`] and [`DisplayRegistry::select`]; readers take a
//! [`ActiveDisplayState`] snapshot so a concurrent selection can never be
//! observed half-applied.

use crate::{DisplayInfo, Platform, Point};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Pixel geometry of the display that pointer samples are mapped onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDisplayState {
    pub active_index: usize,
    pub width_pixels: f64,
    pub height_pixels: f64,
    pub origin_x: i32,
    pub origin_y: i32,
}

impl ActiveDisplayState {
    /// `logical × scale`, origin at the display's native origin.
    pub fn scaled(index: usize, display: &DisplayInfo) -> Self {
        Self {
            active_index: index,
            width_pixels: display.width_logical * display.scale_factor,
            height_pixels: display.height_logical * display.scale_factor,
            origin_x: display.native_origin_x,
            origin_y: display.native_origin_y,
        }
    }

    /// Startup state derived from the primary display.
    ///
    /// On macOS a primary display at exactly 2x keeps logical dimensions: the
    /// injection layer there works in points for 2x displays only. Any other
    /// scale factor is multiplied out as usual.
    pub fn from_primary(platform: Platform, primary: &DisplayInfo) -> Self {
        let mut state = Self::scaled(0, primary);
        if platform == Platform::MacOs && primary.scale_factor == 2.0 {
            state.width_pixels = primary.width_logical;
            state.height_pixels = primary.height_logical;
        }
        state
    }

    /// Map a normalized position onto absolute device pixels.
    ///
    /// Inputs are clamped to `[0, 1]`; rounding is half away from zero.
    /// Returns `None` for NaN or infinite input.
    pub fn map_pointer(&self, x_normalized: f64, y_normalized: f64) -> Option<Point> {
        if !x_normalized.is_finite() || !y_normalized.is_finite() {
            return None;
        }
        let x = scale_axis(x_normalized, self.width_pixels);
        let y = scale_axis(y_normalized, self.height_pixels);
        Some(Point::new(x + self.origin_x, y + self.origin_y))
    }
}

/// Fractional extents (e.g. 1.25x scaling) must not round past the last pixel.
fn scale_axis(normalized: f64, extent: f64) -> i32 {
    let offset = (normalized.clamp(0.0, 1.0) * extent).round();
    offset.min(extent.floor().max(0.0)) as i32
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("display index {index} out of range ({count} displays)")]
    OutOfRange { index: usize, count: usize },
}

#[derive(Debug, Default)]
struct RegistryState {
    active: ActiveDisplayState,
    /// Displays the active index refers to (last init/selection fetch).
    displays: Vec<DisplayInfo>,
    /// Last listing handed to the UI; screenshots target entries of this list.
    listing: Vec<DisplayInfo>,
}

/// Owner of the process-wide active display state.
pub struct DisplayRegistry {
    platform: Platform,
    state: Mutex<RegistryState>,
}

impl DisplayRegistry {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the state from the primary display.
    pub fn initialize(&self, primary: DisplayInfo) -> ActiveDisplayState {
        let active = ActiveDisplayState::from_primary(self.platform, &primary);
        info!(
            width = active.width_pixels,
            height = active.height_pixels,
            scale = primary.scale_factor,
            "Active display initialized from primary"
        );
        let mut state = self.lock();
        state.active = active;
        state.displays = vec![primary];
        active
    }

    /// Make `displays[index]` the active display.
    ///
    /// Out-of-range indices are rejected and leave the state untouched.
    pub fn select(
        &self,
        index: usize,
        displays: Vec<DisplayInfo>,
    ) -> Result<ActiveDisplayState, SelectError> {
        let selected = displays.get(index).ok_or(SelectError::OutOfRange {
            index,
            count: displays.len(),
        })?;
        let active = ActiveDisplayState::scaled(index, selected);
        debug!(index, name = %selected.name, ?active, "Selected display");

        let mut state = self.lock();
        state.active = active;
        state.displays = displays;
        Ok(active)
    }

    /// Current state (copied out, the lock is not held).
    pub fn snapshot(&self) -> ActiveDisplayState {
        self.lock().active
    }

    /// Remember the listing last handed to the UI.
    pub fn remember_listing(&self, displays: Vec<DisplayInfo>) {
        self.lock().listing = displays;
    }

    /// Display id a screenshot should target, if the UI has listed displays.
    pub fn capture_target(&self) -> Option<u32> {
        let state = self.lock();
        state.listing.get(state.active.active_index).map(|d| d.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(id: u32, width: f64, height: f64, scale: f64, origin: (i32, i32)) -> DisplayInfo {
        DisplayInfo {
            id,
            name: format!("Display {id}"),
            width_logical: width,
            height_logical: height,
            scale_factor: scale,
            native_origin_x: origin.0,
            native_origin_y: origin.1,
            is_primary: id == 1,
        }
    }

    #[test]
    fn test_select_then_map_origin() {
        let registry = DisplayRegistry::new(Platform::Linux);
        let displays = vec![
            display(1, 1920.0, 1080.0, 1.0, (0, 0)),
            display(2, 1280.0, 720.0, 1.5, (1920, -200)),
        ];
        let active = registry.select(1, displays).unwrap();
        assert_eq!(active.width_pixels, 1920.0);
        assert_eq!(active.height_pixels, 1080.0);

        let p = registry.snapshot().map_pointer(0.0, 0.0).unwrap();
        assert_eq!(p, Point::new(1920, -200));
    }

    #[test]
    fn test_map_stays_within_display_bounds() {
        let state = ActiveDisplayState::scaled(0, &display(2, 1707.0, 960.0, 1.25, (100, 50)));
        let steps = [0.0, 0.1, 0.25, 0.333, 0.5, 0.77, 0.999, 1.0];
        for &x in &steps {
            for &y in &steps {
                let p = state.map_pointer(x, y).unwrap();
                assert!(p.x >= state.origin_x);
                assert!(p.x as f64 <= state.origin_x as f64 + state.width_pixels);
                assert!(p.y >= state.origin_y);
                assert!(p.y as f64 <= state.origin_y as f64 + state.height_pixels);
            }
        }
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let state = ActiveDisplayState {
            active_index: 0,
            width_pixels: 1001.0,
            height_pixels: 3.0,
            origin_x: 0,
            origin_y: 0,
        };
        // 500.5 -> 501, 1.5 -> 2
        let p = state.map_pointer(0.5, 0.5).unwrap();
        assert_eq!(p, Point::new(501, 2));
    }

    #[test]
    fn test_map_clamps_and_rejects_non_finite() {
        let state = ActiveDisplayState::scaled(0, &display(1, 800.0, 600.0, 1.0, (0, 0)));
        assert_eq!(state.map_pointer(1.2, -0.1), Some(Point::new(800, 0)));
        assert_eq!(state.map_pointer(f64::NAN, 0.5), None);
        assert_eq!(state.map_pointer(0.5, f64::INFINITY), None);
    }

    #[test]
    fn test_macos_retina_exception_only_at_2x() {
        let registry = DisplayRegistry::new(Platform::MacOs);
        let active = registry.initialize(display(1, 1440.0, 900.0, 2.0, (0, 0)));
        assert_eq!(active.width_pixels, 1440.0);
        assert_eq!(active.height_pixels, 900.0);

        let active = registry.initialize(display(1, 1440.0, 900.0, 1.0, (0, 0)));
        assert_eq!(active.width_pixels, 1440.0);

        let active = registry.initialize(display(1, 1440.0, 900.0, 3.0, (0, 0)));
        assert_eq!(active.width_pixels, 4320.0);
        assert_eq!(active.height_pixels, 2700.0);
    }

    #[test]
    fn test_no_exception_off_macos() {
        let registry = DisplayRegistry::new(Platform::Windows);
        let active = registry.initialize(display(1, 1440.0, 900.0, 2.0, (0, 0)));
        assert_eq!(active.width_pixels, 2880.0);
        assert_eq!(active.height_pixels, 1800.0);
    }

    #[test]
    fn test_out_of_range_selection_keeps_state() {
        let registry = DisplayRegistry::new(Platform::Linux);
        registry.select(0, vec![display(1, 1920.0, 1080.0, 1.0, (0, 0))]).unwrap();
        let before = registry.snapshot();

        let err = registry
            .select(3, vec![display(1, 1920.0, 1080.0, 1.0, (0, 0))])
            .unwrap_err();
        assert_eq!(err, SelectError::OutOfRange { index: 3, count: 1 });
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_capture_target_follows_listing() {
        let registry = DisplayRegistry::new(Platform::Linux);
        assert_eq!(registry.capture_target(), None);

        let displays = vec![
            display(7, 1920.0, 1080.0, 1.0, (0, 0)),
            display(9, 1920.0, 1080.0, 1.0, (1920, 0)),
        ];
        registry.remember_listing(displays.clone());
        assert_eq!(registry.capture_target(), Some(7));

        registry.select(1, displays).unwrap();
        assert_eq!(registry.capture_target(), Some(9));
    }
}
