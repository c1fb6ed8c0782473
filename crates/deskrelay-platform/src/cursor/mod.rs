//! System cursor shape detection.
//!
//! Platform implementations:
//! - Windows: compares the current cursor handle against the stock cursors (`windows.rs`)
//! - Other platforms: not detectable, reported as `Unknown`

#[cfg(windows)]
mod windows;

use deskrelay_core::{CursorShape, HostResult};

pub fn current_cursor_shape() -> HostResult<CursorShape> {
    #[cfg(windows)]
    {
        windows::current_cursor_shape()
    }
    #[cfg(not(windows))]
    {
        Ok(CursorShape::Unknown)
    }
}
