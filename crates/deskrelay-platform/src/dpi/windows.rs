//! Windows DPI awareness implementation.

use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Set the process DPI awareness to Per-Monitor V2 so capture sizes and
/// injected positions are both in device pixels.
///
/// Must be called before the first display query.
pub fn set_dpi_aware() {
    INIT.call_once(|| unsafe {
        const DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2: isize = -4;

        #[link(name = "user32")]
        extern "system" {
            fn SetProcessDpiAwarenessContext(value: isize) -> i32;
        }

        if SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) != 0 {
            info!("Set Per-Monitor V2 DPI awareness");
        } else {
            warn!("Failed to set Per-Monitor V2 DPI awareness, display sizes may be scaled");
        }
    });
}
