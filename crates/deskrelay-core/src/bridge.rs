//! Request dispatcher: routes decoded requests to host collaborators.
//!
//! Every handler is wrapped the same way. A failure is logged, handed to the
//! [`Reporter`] with the handler's reserved code and then either dropped (send
//! channels) or returned to the UI as an [`crate::ErrorEnvelope`] (invoke channels).

use crate::error::WithCode;
use crate::{
    button_from_code, injection_key_name, parse_modifiers, ActiveDisplayState, CaptureSource,
    Channel, CursorShape, Direction, DisplayHost, DisplayRegistry, ErrorCode, Inbound,
    InputAction, InputInjector, MouseButton, Outbound, Platform, Point, PointerFilter,
    PointerHost, RelayError, Reporter, Request,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Reply to `get-displays`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayListing {
    pub total_displays: usize,
    pub sources: Vec<CaptureSource>,
    pub displays: Vec<DisplayEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayEntry {
    pub id: u32,
    pub name: String,
}

/// Reply to `screen-resolution`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResolution {
    pub os: Platform,
    pub screen_height: f64,
    pub screen_width: f64,
}

/// Reply to `get-cursor-style`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorStyle {
    pub shape: CursorShape,
}

/// Single coordinator for all requests; owns the active display state.
pub struct Bridge {
    displays: Arc<dyn DisplayHost>,
    injector: Arc<dyn InputInjector>,
    pointer: Arc<dyn PointerHost>,
    reporter: Arc<dyn Reporter>,
    registry: DisplayRegistry,
    pointer_filter: PointerFilter,
}

impl Bridge {
    /// Create the bridge and seed display/pointer state from the host.
    pub fn new(
        displays: Arc<dyn DisplayHost>,
        injector: Arc<dyn InputInjector>,
        pointer: Arc<dyn PointerHost>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let registry = DisplayRegistry::new(displays.platform());
        let bridge = Self {
            displays,
            injector,
            pointer,
            reporter,
            registry,
            pointer_filter: PointerFilter::default(),
        };
        bridge.initialize();
        bridge
    }

    fn initialize(&self) {
        match self
            .displays
            .primary_display()
            .with_code(ErrorCode::PrimaryDisplay)
        {
            Ok(primary) => {
                self.registry.initialize(primary);
            }
            Err(e) => self.fail(&e),
        }

        match self.pointer.pointer_position() {
            Ok(position) => self.pointer_filter.remember(position),
            Err(e) => warn!("Initial pointer position unavailable: {}", e),
        }
    }

    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    /// Handle one inbound message; returns a reply for invoke channels only.
    pub fn handle(&self, inbound: Inbound) -> Option<Outbound> {
        let Some(channel) = Channel::from_name(&inbound.channel) else {
            warn!(channel = %inbound.channel, "No handler for channel, dropping message");
            return None;
        };

        let result = Request::decode(channel, inbound.payload)
            .map_err(|e| RelayError::invalid(channel.code(), e.to_string()))
            .and_then(|request| self.dispatch(request));

        if !channel.expects_reply() {
            if let Err(e) = result {
                self.fail(&e);
            }
            return None;
        }

        let result = result.unwrap_or_else(|e| {
            self.fail(&e);
            serde_json::to_value(e.envelope()).unwrap_or(Value::Null)
        });
        Some(Outbound {
            id: inbound.id,
            result,
        })
    }

    /// Account for a handler that died without producing a result.
    ///
    /// The failure is logged and reported under the channel's code; invoke
    /// channels still get an envelope so the UI is not left waiting.
    pub fn handler_fault(
        &self,
        channel: &str,
        id: Option<u64>,
        reason: impl Into<String>,
    ) -> Option<Outbound> {
        let reason = reason.into();
        let Some(channel) = Channel::from_name(channel) else {
            warn!(channel, "Handler fault on unknown channel: {}", reason);
            return None;
        };
        let err = RelayError::invalid(channel.code(), reason);
        self.fail(&err);
        channel.expects_reply().then(|| Outbound {
            id,
            result: serde_json::to_value(err.envelope()).unwrap_or(Value::Null),
        })
    }

    /// Run one decoded request. Send channels yield `Value::Null` on success.
    pub fn dispatch(&self, request: Request) -> Result<Value, RelayError> {
        debug!(?request, "Dispatching request");
        match request {
            Request::GetScreenshot => self.screenshot().map(Value::String),
            Request::MouseMove { x, y } => self.inject_pointer_move(x, y).map(|_| Value::Null),
            Request::MouseClick { button } => self.inject_click(button).map(|_| Value::Null),
            Request::MouseDown => self.inject_button_down().map(|_| Value::Null),
            Request::MouseUp => self.inject_button_up().map(|_| Value::Null),
            Request::MouseScroll { delta_x, delta_y } => {
                self.inject_scroll(delta_x, delta_y).map(|_| Value::Null)
            }
            Request::KeyUp { key, modifiers } => {
                self.inject_key_press(&key, &modifiers).map(|_| Value::Null)
            }
            Request::ScreenNumber(index) => self.select_display(index).map(|_| Value::Null),
            Request::GetMousePos => {
                let position = self.current_pointer_position()?;
                encode(ErrorCode::MousePosition, &position)
            }
            Request::CaptureScreen => self.capture_source().map(Value::String),
            Request::CheckAccess => self.check_access().map(Value::Bool),
            Request::GetOs => Ok(Value::String(self.platform_name().to_string())),
            Request::GetCursorStyle => {
                let style = self.cursor_style()?;
                encode(ErrorCode::CursorShape, &style)
            }
            Request::ScreenResolution => {
                encode(ErrorCode::ScreenResolution, &self.screen_resolution())
            }
            Request::GetDisplays => {
                let listing = self.list_displays()?;
                encode(ErrorCode::DisplayList, &listing)
            }
        }
    }

    fn fail(&self, err: &RelayError) {
        let code = err.code();
        error!(code = code.as_u16(), "ERROR {} - {}", code, err);
        let chain = err.cause_chain();
        self.reporter.report(code, &err.to_string(), chain.as_deref());
    }

    /// Enumerate capture sources and displays; the display list becomes the
    /// screenshot target list.
    pub fn list_displays(&self) -> Result<DisplayListing, RelayError> {
        let sources = self
            .displays
            .capture_sources()
            .with_code(ErrorCode::DisplayList)?;
        let displays = self
            .displays
            .all_displays()
            .with_code(ErrorCode::DisplayList)?;

        let entries: Vec<DisplayEntry> = displays
            .iter()
            .map(|d| DisplayEntry {
                id: d.id,
                name: d.name.clone(),
            })
            .collect();
        self.registry.remember_listing(displays);

        Ok(DisplayListing {
            total_displays: entries.len(),
            sources,
            displays: entries,
        })
    }

    /// Make display `index` (host order) the target of pointer mapping.
    pub fn select_display(&self, index: i64) -> Result<ActiveDisplayState, RelayError> {
        let index = usize::try_from(index).map_err(|_| {
            RelayError::invalid(ErrorCode::SwitchScreen, format!("negative display index {index}"))
        })?;
        let displays = self
            .displays
            .all_displays()
            .with_code(ErrorCode::SwitchScreen)?;
        self.registry
            .select(index, displays)
            .map_err(|e| RelayError::invalid(ErrorCode::SwitchScreen, e.to_string()))
    }

    /// Normalized position to absolute pixels on the active display.
    pub fn map_pointer(&self, x: f64, y: f64) -> Result<Point, RelayError> {
        self.registry.snapshot().map_pointer(x, y).ok_or_else(|| {
            RelayError::invalid(ErrorCode::MouseMove, format!("non-finite position ({x}, {y})"))
        })
    }

    /// Host pointer position if it moved since the last observation.
    pub fn current_pointer_position(&self) -> Result<Option<Point>, RelayError> {
        let position = self
            .pointer
            .pointer_position()
            .with_code(ErrorCode::MousePosition)?;
        Ok(self.pointer_filter.observe(position))
    }

    pub fn inject_pointer_move(&self, x: f64, y: f64) -> Result<Point, RelayError> {
        let target = self.map_pointer(x, y)?;
        self.injector
            .inject(&InputAction::MoveTo {
                x: target.x,
                y: target.y,
            })
            .with_code(ErrorCode::MouseMove)?;
        self.pointer_filter.remember(target);
        Ok(target)
    }

    pub fn inject_click(&self, button_code: i64) -> Result<(), RelayError> {
        let button = button_from_code(button_code);
        self.injector
            .inject(&InputAction::Click { button })
            .with_code(ErrorCode::MouseClick)
    }

    pub fn inject_button_down(&self) -> Result<(), RelayError> {
        self.injector
            .inject(&InputAction::Button {
                button: MouseButton::Left,
                direction: Direction::Press,
            })
            .with_code(ErrorCode::MouseDown)
    }

    pub fn inject_button_up(&self) -> Result<(), RelayError> {
        self.injector
            .inject(&InputAction::Button {
                button: MouseButton::Left,
                direction: Direction::Release,
            })
            .with_code(ErrorCode::MouseUp)
    }

    pub fn inject_scroll(&self, delta_x: f64, delta_y: f64) -> Result<(), RelayError> {
        if !delta_x.is_finite() || !delta_y.is_finite() {
            return Err(RelayError::invalid(
                ErrorCode::MouseScroll,
                format!("non-finite scroll delta ({delta_x}, {delta_y})"),
            ));
        }
        self.injector
            .inject(&InputAction::Scroll {
                delta_x: delta_x.round() as i32,
                delta_y: delta_y.round() as i32,
            })
            .with_code(ErrorCode::MouseScroll)
    }

    /// Inject a key as a down transition immediately followed by an up transition.
    pub fn inject_key_press(&self, key: &str, modifiers: &[String]) -> Result<(), RelayError> {
        if key.is_empty() {
            return Err(RelayError::invalid(ErrorCode::KeyPress, "empty key"));
        }
        let name = injection_key_name(key);
        let modifiers = parse_modifiers(modifiers);
        let key_action = |direction| InputAction::Key {
            key: name.clone(),
            direction,
            modifiers: modifiers.clone(),
        };
        // The release runs even when the press failed so no key stays down.
        let pressed = self.injector.inject(&key_action(Direction::Press));
        let released = self.injector.inject(&key_action(Direction::Release));
        pressed.and(released).with_code(ErrorCode::KeyPress)
    }

    /// PNG of the targeted display, base64-encoded for the JSON channel.
    pub fn screenshot(&self) -> Result<String, RelayError> {
        let display_id = match self.registry.capture_target() {
            Some(id) => id,
            None => {
                self.displays
                    .primary_display()
                    .with_code(ErrorCode::Screenshot)?
                    .id
            }
        };
        let png = self
            .displays
            .capture_png(display_id)
            .with_code(ErrorCode::Screenshot)?;
        debug!(display_id, bytes = png.len(), "Captured screenshot");
        Ok(STANDARD.encode(png))
    }

    /// Capture-source id of the active display.
    pub fn capture_source(&self) -> Result<String, RelayError> {
        let index = self.registry.snapshot().active_index;
        let sources = self
            .displays
            .capture_sources()
            .with_code(ErrorCode::CaptureSource)?;
        let count = sources.len();
        sources.into_iter().nth(index).map(|s| s.id).ok_or_else(|| {
            RelayError::invalid(
                ErrorCode::CaptureSource,
                format!("no capture source at index {index} ({count} sources)"),
            )
        })
    }

    pub fn check_access(&self) -> Result<bool, RelayError> {
        self.displays
            .screen_access()
            .with_code(ErrorCode::AccessCheck)
    }

    pub fn platform_name(&self) -> &'static str {
        self.registry.platform().ui_name()
    }

    pub fn cursor_style(&self) -> Result<CursorStyle, RelayError> {
        let shape = self
            .pointer
            .cursor_shape()
            .with_code(ErrorCode::CursorShape)?;
        Ok(CursorStyle { shape })
    }

    pub fn screen_resolution(&self) -> ScreenResolution {
        let active = self.registry.snapshot();
        ScreenResolution {
            os: self.registry.platform(),
            screen_height: active.height_pixels,
            screen_width: active.width_pixels,
        }
    }
}

fn encode<T: Serialize>(code: ErrorCode, value: &T) -> Result<Value, RelayError> {
    serde_json::to_value(value).map_err(|e| RelayError::invalid(code, e.to_string()))
}
