//! `DisplayHost` backed by `xcap`.

use crate::access::screen_capture_allowed;
use crate::dpi::logical_extent;
use deskrelay_core::{CaptureSource, DisplayHost, DisplayInfo, HostError, HostResult, Platform};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::{debug, warn};
use xcap::Monitor;

fn unavailable(e: impl std::fmt::Display) -> HostError {
    HostError::Unavailable(e.to_string())
}

/// Source id in the desktop-capturer format, `screen:<display id>:0`.
pub(crate) fn source_id(display_id: u32) -> String {
    format!("screen:{display_id}:0")
}

pub struct XcapDisplayHost {
    platform: Platform,
}

impl XcapDisplayHost {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }

    fn monitors(&self) -> HostResult<Vec<Monitor>> {
        let monitors = Monitor::all().map_err(unavailable)?;
        if monitors.is_empty() {
            return Err(HostError::Unavailable("no displays attached".into()));
        }
        Ok(monitors)
    }

    fn describe(&self, monitor: &Monitor) -> HostResult<DisplayInfo> {
        let scale_factor = monitor.scale_factor().map_err(unavailable)? as f64;
        let reports_points = self.platform == Platform::MacOs;
        Ok(DisplayInfo {
            id: monitor.id().map_err(unavailable)?,
            name: monitor.name().map_err(unavailable)?,
            width_logical: logical_extent(
                monitor.width().map_err(unavailable)?,
                scale_factor,
                reports_points,
            ),
            height_logical: logical_extent(
                monitor.height().map_err(unavailable)?,
                scale_factor,
                reports_points,
            ),
            scale_factor,
            native_origin_x: monitor.x().map_err(unavailable)?,
            native_origin_y: monitor.y().map_err(unavailable)?,
            is_primary: monitor.is_primary().map_err(unavailable)?,
        })
    }
}

impl Default for XcapDisplayHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayHost for XcapDisplayHost {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn primary_display(&self) -> HostResult<DisplayInfo> {
        let monitors = self.monitors()?;
        for monitor in &monitors {
            if monitor.is_primary().unwrap_or(false) {
                return self.describe(monitor);
            }
        }
        warn!("No display flagged primary, using the first one");
        self.describe(&monitors[0])
    }

    fn all_displays(&self) -> HostResult<Vec<DisplayInfo>> {
        self.monitors()?
            .iter()
            .map(|m| self.describe(m))
            .collect()
    }

    fn capture_sources(&self) -> HostResult<Vec<CaptureSource>> {
        self.monitors()?
            .iter()
            .map(|m| {
                Ok(CaptureSource {
                    id: source_id(m.id().map_err(unavailable)?),
                    name: m.name().map_err(unavailable)?,
                })
            })
            .collect()
    }

    fn capture_png(&self, display_id: u32) -> HostResult<Vec<u8>> {
        let monitor = self
            .monitors()?
            .into_iter()
            .find(|m| m.id().ok() == Some(display_id))
            .ok_or_else(|| HostError::CaptureFailed(format!("display {display_id} not found")))?;

        let image = monitor
            .capture_image()
            .map_err(|e| HostError::CaptureFailed(e.to_string()))?;
        let (width, height) = (image.width(), image.height());

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| HostError::CaptureFailed(format!("png encode: {e}")))?;
        debug!(display_id, width, height, bytes = png.len(), "Encoded capture");
        Ok(png)
    }

    fn screen_access(&self) -> HostResult<bool> {
        Ok(screen_capture_allowed())
    }
}
