//! deskrelay-platform: platform-specific I/O boundary for deskrelay.
//!
//! This crate provides:
//! - Display enumeration, capture and permission checks via `xcap`
//! - Input injection (mouse/keyboard simulation) via `enigo`
//! - Pointer position and cursor shape queries
//! - DPI awareness setup for high-resolution displays
//! - Host metadata for error telemetry via `sysinfo`
//!
//! ## Module Structure
//!
//! - `display` - `DisplayHost` backed by `xcap`
//! - `injector` - `InputInjector` backed by `enigo`
//! - `pointer` - `PointerHost` (position + cursor shape)
//! - `cursor` - Cursor shape detection (Windows native, `Unknown` elsewhere)
//! - `access` - Screen recording permission check
//! - `dpi` - DPI awareness and logical extent conversion
//! - `host_info` - Host metadata collection

mod access;
mod cursor;
mod display;
mod dpi;
mod host_info;
mod injector;
mod pointer;

pub use display::XcapDisplayHost;
pub use dpi::{logical_extent, set_dpi_aware};
pub use host_info::collect_host_metadata;
pub use injector::EnigoInjector;
pub use pointer::SystemPointer;
