//! Host collaborator traits (implemented by deskrelay-platform).

use crate::{CaptureSource, CursorShape, DisplayInfo, HostResult, InputAction, Platform, Point};
use tracing::debug;

/// Display enumeration, capture and permission queries.
pub trait DisplayHost: Send + Sync {
    fn platform(&self) -> Platform;

    fn primary_display(&self) -> HostResult<DisplayInfo>;

    /// All displays, in host order. Queried fresh on every call.
    fn all_displays(&self) -> HostResult<Vec<DisplayInfo>>;

    /// Capturable screen sources, parallel to [`DisplayHost::all_displays`].
    fn capture_sources(&self) -> HostResult<Vec<CaptureSource>>;

    /// Capture one display as PNG bytes.
    fn capture_png(&self, display_id: u32) -> HostResult<Vec<u8>>;

    /// Whether the process may record the screen.
    fn screen_access(&self) -> HostResult<bool>;
}

/// Trait for injecting mouse/keyboard primitives into the OS.
pub trait InputInjector: Send + Sync {
    fn inject(&self, action: &InputAction) -> HostResult<()>;
}

/// Pointer queries.
pub trait PointerHost: Send + Sync {
    fn pointer_position(&self) -> HostResult<Point>;

    fn cursor_shape(&self) -> HostResult<CursorShape>;
}

/// Injector that only logs; used for dry runs and tests.
pub struct NoopInjector;

impl InputInjector for NoopInjector {
    fn inject(&self, action: &InputAction) -> HostResult<()> {
        debug!(?action, "NoopInjector: would inject action");
        Ok(())
    }
}
