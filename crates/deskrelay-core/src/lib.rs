//! deskrelay-core: display model, coordinate mapping and request dispatch.
//!
//! Design goal: keep this crate platform-agnostic.
//! Host I/O (capture, injection, pointer queries) lives in `deskrelay-platform`
//! behind the traits in [`host`].

mod bridge;
mod display;
mod error;
mod host;
mod keymap;
mod pointer;
mod protocol;
mod telemetry;

pub use bridge::{Bridge, CursorStyle, DisplayEntry, DisplayListing, ScreenResolution};
pub use display::{ActiveDisplayState, DisplayRegistry, SelectError};
pub use error::{ErrorCode, ErrorEnvelope, HostError, HostResult, RelayError};
pub use host::{DisplayHost, InputInjector, NoopInjector, PointerHost};
pub use keymap::{button_from_code, injection_key_name, parse_modifiers};
pub use pointer::PointerFilter;
pub use protocol::{Channel, Inbound, Outbound, ProtocolError, Request};
pub use telemetry::{ErrorRecord, HostMetadata, NoopReporter, Reporter};

use serde::{Deserialize, Serialize, Serializer};

/// Immutable snapshot of one physical display as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub id: u32,
    pub name: String,
    /// Width in logical units (points / DIPs).
    pub width_logical: f64,
    /// Height in logical units (points / DIPs).
    pub height_logical: f64,
    /// Device pixels per logical unit.
    pub scale_factor: f64,
    /// Top-left corner within the virtual desktop, in the injection layer's units.
    pub native_origin_x: i32,
    pub native_origin_y: i32,
    pub is_primary: bool,
}

/// A capturable screen source (id + human-readable name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSource {
    pub id: String,
    pub name: String,
}

/// Absolute pointer position in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Press,
    Release,
}

/// Modifier held while a key pair is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Command,
}

/// A single primitive handed to the input-injection layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    /// Move the pointer to an absolute position.
    MoveTo { x: i32, y: i32 },
    /// Press and release a button at the current position.
    Click { button: MouseButton },
    /// Toggle a button without releasing (drag support).
    Button { button: MouseButton, direction: Direction },
    /// Scroll wheel.
    Scroll { delta_x: i32, delta_y: i32 },
    /// Toggle a named key; `key` uses injection-layer names (`enter`, `up`, `q`).
    Key {
        key: String,
        direction: Direction,
        modifiers: Vec<Modifier>,
    },
}

/// Host operating system, named the way the UI layer expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other(&'static str),
}

impl Platform {
    /// Platform of the running process.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &'static str) -> Self {
        match os {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            other => Self::Other(other),
        }
    }

    /// `darwin` / `win32` / `linux`, or the raw OS name elsewhere.
    pub fn ui_name(&self) -> &'static str {
        match self {
            Self::MacOs => "darwin",
            Self::Windows => "win32",
            Self::Linux => "linux",
            Self::Other(os) => os,
        }
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.ui_name())
    }
}

/// Shape of the system cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorShape {
    Arrow,
    Ibeam,
    Hand,
    Wait,
    Crosshair,
    ResizeNs,
    ResizeEw,
    ResizeNwse,
    ResizeNesw,
    Move,
    NotAllowed,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_ui_names() {
        assert_eq!(Platform::from_os("macos").ui_name(), "darwin");
        assert_eq!(Platform::from_os("windows").ui_name(), "win32");
        assert_eq!(Platform::from_os("linux").ui_name(), "linux");
        assert_eq!(Platform::from_os("freebsd").ui_name(), "freebsd");
    }

    #[test]
    fn test_cursor_shape_serializes_kebab_case() {
        let json = serde_json::to_string(&CursorShape::ResizeNwse).unwrap();
        assert_eq!(json, "\"resize-nwse\"");
    }
}
