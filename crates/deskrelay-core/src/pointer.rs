//! Edge-triggered pointer change detection.

use crate::Point;
use std::sync::{Mutex, PoisonError};

/// Remembers the last known pointer position and only reports changes.
///
/// This is a single-slot filter, not a history: any position different from
/// the last one is reported, even if it was seen before.
#[derive(Debug, Default)]
pub struct PointerFilter {
    last: Mutex<Option<Point>>,
}

impl PointerFilter {
    pub fn new(initial: Option<Point>) -> Self {
        Self {
            last: Mutex::new(initial),
        }
    }

    /// Record `current`; returns it if it differs from the last known value.
    pub fn observe(&self, current: Point) -> Option<Point> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = *last != Some(current);
        *last = Some(current);
        changed.then_some(current)
    }

    /// Set the last known position without reporting (e.g. after injecting a move).
    pub fn remember(&self, position: Point) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }

    pub fn last(&self) -> Option<Point> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
