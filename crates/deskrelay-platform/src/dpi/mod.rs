//! DPI handling for high-resolution displays.
//!
//! Pointer mapping works in device pixels, so the process must see unscaled
//! coordinates from the system:
//! - Windows: Per-Monitor V2 DPI awareness (`windows.rs`)
//! - macOS: capture reports points; scaling is applied by the registry
//! - Other platforms: no-op

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::set_dpi_aware;

#[cfg(not(windows))]
pub fn set_dpi_aware() {}

/// Logical extent of a display dimension reported by the capture layer.
///
/// On macOS the capture layer already reports points. Elsewhere the process is
/// DPI-aware and sees device pixels, which are divided back down.
pub fn logical_extent(raw: u32, scale_factor: f64, reports_points: bool) -> f64 {
    if reports_points || scale_factor <= 0.0 || !scale_factor.is_finite() {
        raw as f64
    } else {
        raw as f64 / scale_factor
    }
}
