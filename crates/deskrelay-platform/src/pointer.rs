//! Pointer position and cursor shape.

use crate::cursor::current_cursor_shape;
use deskrelay_core::{CursorShape, HostError, HostResult, Point, PointerHost};
#[cfg(not(target_os = "macos"))]
use enigo::{Enigo, Mouse, Settings};
#[cfg(not(target_os = "macos"))]
use std::sync::{Mutex, PoisonError};

/// Pointer queries against the live desktop.
///
/// macOS reads the location from a fresh Core Graphics event so no
/// accessibility permission is needed; other platforms ask `enigo`.
pub struct SystemPointer {
    #[cfg(not(target_os = "macos"))]
    enigo: Mutex<Enigo>,
}

impl SystemPointer {
    pub fn new() -> HostResult<Self> {
        #[cfg(not(target_os = "macos"))]
        {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| HostError::Unavailable(format!("failed to create Enigo: {e}")))?;
            Ok(Self {
                enigo: Mutex::new(enigo),
            })
        }
        #[cfg(target_os = "macos")]
        {
            Ok(Self {})
        }
    }
}

impl PointerHost for SystemPointer {
    #[cfg(not(target_os = "macos"))]
    fn pointer_position(&self) -> HostResult<Point> {
        let enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);
        let (x, y) = enigo
            .location()
            .map_err(|e| HostError::Unavailable(format!("pointer location: {e}")))?;
        Ok(Point::new(x, y))
    }

    #[cfg(target_os = "macos")]
    fn pointer_position(&self) -> HostResult<Point> {
        use core_graphics::event::CGEvent;
        use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

        let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState)
            .map_err(|_| HostError::Unavailable("CGEventSource unavailable".into()))?;
        let event = CGEvent::new(source)
            .map_err(|_| HostError::Unavailable("CGEvent unavailable".into()))?;
        let location = event.location();
        Ok(Point::new(location.x.round() as i32, location.y.round() as i32))
    }

    fn cursor_shape(&self) -> HostResult<CursorShape> {
        current_cursor_shape()
    }
}
