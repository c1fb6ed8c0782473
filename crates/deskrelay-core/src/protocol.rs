//! Request surface: channel names, payload decoding and reply framing.
//!
//! Each line on the wire is one JSON object:
//! `{"id": 3, "channel": "mouse-move", "payload": {"x": 0.5, "y": 0.25}}`.
//! Invoke channels answer with `{"id": 3, "result": ...}`; send channels never answer.

use crate::ErrorCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid payload for '{channel}': {source}")]
    InvalidPayload {
        channel: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw inbound message, before the payload is decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct Inbound {
    #[serde(default)]
    pub id: Option<u64>,
    pub channel: String,
    #[serde(default)]
    pub payload: Value,
}

impl Inbound {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line).map_err(ProtocolError::Malformed)
    }
}

/// Reply to an invoke channel.
#[derive(Debug, Clone, Serialize)]
pub struct Outbound {
    pub id: Option<u64>,
    pub result: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    GetScreenshot,
    MouseMove,
    MouseClick,
    MouseDown,
    MouseUp,
    MouseScroll,
    KeyUp,
    ScreenNumber,
    GetMousePos,
    CaptureScreen,
    CheckAccess,
    GetOs,
    GetCursorStyle,
    ScreenResolution,
    GetDisplays,
}

impl Channel {
    pub const ALL: [Channel; 15] = [
        Channel::GetScreenshot,
        Channel::MouseMove,
        Channel::MouseClick,
        Channel::MouseDown,
        Channel::MouseUp,
        Channel::MouseScroll,
        Channel::KeyUp,
        Channel::ScreenNumber,
        Channel::GetMousePos,
        Channel::CaptureScreen,
        Channel::CheckAccess,
        Channel::GetOs,
        Channel::GetCursorStyle,
        Channel::ScreenResolution,
        Channel::GetDisplays,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GetScreenshot => "get-screenshot",
            Self::MouseMove => "mouse-move",
            Self::MouseClick => "mouse-click",
            Self::MouseDown => "mouse-down",
            Self::MouseUp => "mouse-up",
            Self::MouseScroll => "mouse-scroll",
            Self::KeyUp => "key-up",
            Self::ScreenNumber => "screen-number",
            Self::GetMousePos => "get-mouse-pos",
            Self::CaptureScreen => "capture-screen",
            Self::CheckAccess => "check-access",
            Self::GetOs => "get-os",
            Self::GetCursorStyle => "get-cursor-style",
            Self::ScreenResolution => "screen-resolution",
            Self::GetDisplays => "get-displays",
        }
    }

    /// Reserved error code of the handler behind this channel.
    pub fn code(self) -> ErrorCode {
        match self {
            Self::GetScreenshot => ErrorCode::Screenshot,
            Self::MouseMove => ErrorCode::MouseMove,
            Self::MouseClick => ErrorCode::MouseClick,
            Self::MouseDown => ErrorCode::MouseDown,
            Self::MouseUp => ErrorCode::MouseUp,
            Self::MouseScroll => ErrorCode::MouseScroll,
            Self::KeyUp => ErrorCode::KeyPress,
            Self::ScreenNumber => ErrorCode::SwitchScreen,
            Self::GetMousePos => ErrorCode::MousePosition,
            Self::CaptureScreen => ErrorCode::CaptureSource,
            Self::CheckAccess => ErrorCode::AccessCheck,
            Self::GetOs => ErrorCode::OsInfo,
            Self::GetCursorStyle => ErrorCode::CursorShape,
            Self::ScreenResolution => ErrorCode::ScreenResolution,
            Self::GetDisplays => ErrorCode::DisplayList,
        }
    }

    /// Invoke channels reply; send channels are fire-and-forget.
    pub fn expects_reply(self) -> bool {
        !matches!(
            self,
            Self::MouseMove
                | Self::MouseClick
                | Self::MouseDown
                | Self::MouseUp
                | Self::MouseScroll
                | Self::KeyUp
                | Self::ScreenNumber
        )
    }
}

/// Modifier payload: the UI sends either one name or a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ModifierField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct MoveArgs {
    x: f64,
    y: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClickArgs {
    button: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScrollArgs {
    delta_x: f64,
    delta_y: f64,
}

#[derive(Debug, Deserialize)]
struct KeyArgs {
    key: String,
    #[serde(default)]
    code: Option<ModifierField>,
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetScreenshot,
    MouseMove { x: f64, y: f64 },
    MouseClick { button: i64 },
    MouseDown,
    MouseUp,
    MouseScroll { delta_x: f64, delta_y: f64 },
    KeyUp { key: String, modifiers: Vec<String> },
    ScreenNumber(i64),
    GetMousePos,
    CaptureScreen,
    CheckAccess,
    GetOs,
    GetCursorStyle,
    ScreenResolution,
    GetDisplays,
}

fn payload<T: DeserializeOwned>(channel: Channel, value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|source| ProtocolError::InvalidPayload {
        channel: channel.name(),
        source,
    })
}

/// Like [`payload`], but an absent payload means "all defaults".
fn payload_or_default<T: DeserializeOwned + Default>(
    channel: Channel,
    value: Value,
) -> Result<T, ProtocolError> {
    if value.is_null() {
        Ok(T::default())
    } else {
        payload(channel, value)
    }
}

impl Request {
    pub fn decode(channel: Channel, value: Value) -> Result<Self, ProtocolError> {
        let request = match channel {
            Channel::GetScreenshot => Self::GetScreenshot,
            Channel::MouseMove => {
                let args: MoveArgs = payload(channel, value)?;
                Self::MouseMove { x: args.x, y: args.y }
            }
            Channel::MouseClick => {
                let args: ClickArgs = payload_or_default(channel, value)?;
                Self::MouseClick {
                    button: args.button,
                }
            }
            Channel::MouseDown => Self::MouseDown,
            Channel::MouseUp => Self::MouseUp,
            Channel::MouseScroll => {
                let args: ScrollArgs = payload_or_default(channel, value)?;
                Self::MouseScroll {
                    delta_x: args.delta_x,
                    delta_y: args.delta_y,
                }
            }
            Channel::KeyUp => {
                let args: KeyArgs = payload(channel, value)?;
                let modifiers = match args.code {
                    None => Vec::new(),
                    Some(ModifierField::One(name)) => vec![name],
                    Some(ModifierField::Many(names)) => names,
                };
                Self::KeyUp {
                    key: args.key,
                    modifiers,
                }
            }
            Channel::ScreenNumber => Self::ScreenNumber(payload(channel, value)?),
            Channel::GetMousePos => Self::GetMousePos,
            Channel::CaptureScreen => Self::CaptureScreen,
            Channel::CheckAccess => Self::CheckAccess,
            Channel::GetOs => Self::GetOs,
            Channel::GetCursorStyle => Self::GetCursorStyle,
            Channel::ScreenResolution => Self::ScreenResolution,
            Channel::GetDisplays => Self::GetDisplays,
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(Channel::from_name("stop-share"), None);
    }

    #[test]
    fn test_send_channels_do_not_reply() {
        assert!(!Channel::MouseMove.expects_reply());
        assert!(!Channel::ScreenNumber.expects_reply());
        assert!(Channel::GetMousePos.expects_reply());
        assert!(Channel::GetDisplays.expects_reply());
    }

    #[test]
    fn test_parse_inbound_without_id_or_payload() {
        let inbound = Inbound::parse(r#"{"channel":"mouse-down"}"#).unwrap();
        assert_eq!(inbound.id, None);
        assert!(inbound.payload.is_null());

        let request = Request::decode(Channel::MouseDown, inbound.payload).unwrap();
        assert_eq!(request, Request::MouseDown);
    }

    #[test]
    fn test_decode_payloads() {
        let r = Request::decode(Channel::MouseMove, json!({"x": 0.5, "y": 0.25})).unwrap();
        assert_eq!(r, Request::MouseMove { x: 0.5, y: 0.25 });

        let r = Request::decode(Channel::MouseScroll, json!({"deltaX": 0, "deltaY": -120.5}))
            .unwrap();
        assert_eq!(
            r,
            Request::MouseScroll {
                delta_x: 0.0,
                delta_y: -120.5
            }
        );

        let r = Request::decode(Channel::MouseClick, Value::Null).unwrap();
        assert_eq!(r, Request::MouseClick { button: 0 });

        let r = Request::decode(Channel::ScreenNumber, json!(1)).unwrap();
        assert_eq!(r, Request::ScreenNumber(1));
    }

    #[test]
    fn test_decode_key_modifiers() {
        let r = Request::decode(Channel::KeyUp, json!({"key": "a", "code": "shift"})).unwrap();
        assert_eq!(
            r,
            Request::KeyUp {
                key: "a".into(),
                modifiers: vec!["shift".into()]
            }
        );

        let r = Request::decode(Channel::KeyUp, json!({"key": "a", "code": ["shift", "alt"]}))
            .unwrap();
        assert!(matches!(r, Request::KeyUp { modifiers, .. } if modifiers.len() == 2));

        let r = Request::decode(Channel::KeyUp, json!({"key": "Enter"})).unwrap();
        assert!(matches!(r, Request::KeyUp { modifiers, .. } if modifiers.is_empty()));
    }

    #[test]
    fn test_invalid_payload() {
        let err = Request::decode(Channel::MouseMove, json!({"x": "left"})).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidPayload {
                channel: "mouse-move",
                ..
            }
        ));
    }
}
