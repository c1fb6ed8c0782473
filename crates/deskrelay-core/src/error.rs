//! Error types shared by the host boundary and the request dispatcher.

use serde::Serialize;
use thiserror::Error;

/// Failures raised by host collaborators (capture, injection, queries).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("not supported on this platform: {0}")]
    NotSupported(&'static str),
    #[error("host unavailable: {0}")]
    Unavailable(String),
    #[error("injection failed: {0}")]
    InjectionFailed(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Reserved numeric codes, one per request handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    PrimaryDisplay = 1001,
    Screenshot = 1002,
    MouseMove = 1003,
    MouseClick = 1004,
    MouseDown = 1005,
    MouseUp = 1006,
    MouseScroll = 1007,
    KeyPress = 1008,
    SwitchScreen = 1009,
    MousePosition = 1010,
    CaptureSource = 1011,
    AccessCheck = 1012,
    OsInfo = 1013,
    CursorShape = 1014,
    ScreenResolution = 1015,
    DisplayList = 1016,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PrimaryDisplay => "Failed to retrieve primary display info",
            Self::Screenshot => "Failed to capture screenshot",
            Self::MouseMove => "Failed to move mouse",
            Self::MouseClick => "Failed to execute mouse click",
            Self::MouseDown => "Failed to execute mouse down event",
            Self::MouseUp => "Failed to execute mouse up event",
            Self::MouseScroll => "Failed to execute mouse scroll",
            Self::KeyPress => "Failed to execute key press",
            Self::SwitchScreen => "Failed to switch screen",
            Self::MousePosition => "Failed to retrieve mouse position",
            Self::CaptureSource => "Failed to capture screen source",
            Self::AccessCheck => "Failed to check screen access permissions",
            Self::OsInfo => "Failed to retrieve OS information",
            Self::CursorShape => "Failed to detect cursor shape",
            Self::ScreenResolution => "Failed to retrieve screen resolution",
            Self::DisplayList => "Failed to retrieve display list",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A handler failure tagged with the handler's reserved code.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{}: {source}", .code.description())]
    Host {
        code: ErrorCode,
        #[source]
        source: HostError,
    },
    #[error("{}: {reason}", .code.description())]
    Invalid { code: ErrorCode, reason: String },
}

impl RelayError {
    pub fn host(code: ErrorCode, source: HostError) -> Self {
        Self::Host { code, source }
    }

    pub fn invalid(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self::Invalid {
            code,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Host { code, .. } | Self::Invalid { code, .. } => *code,
        }
    }

    /// Source chain below the top-level message, one cause per line.
    pub fn cause_chain(&self) -> Option<String> {
        let mut causes = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            causes.push(format!("caused by: {cause}"));
            current = cause.source();
        }
        if causes.is_empty() {
            None
        } else {
            Some(causes.join("\n"))
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: true,
            code: self.code().as_u16(),
            message: self.to_string(),
        }
    }
}

/// Structured failure returned to the UI instead of data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub code: u16,
    pub message: String,
}

/// Attach a reserved code to a host result.
pub(crate) trait WithCode<T> {
    fn with_code(self, code: ErrorCode) -> Result<T, RelayError>;
}

impl<T> WithCode<T> for HostResult<T> {
    fn with_code(self, code: ErrorCode) -> Result<T, RelayError> {
        self.map_err(|source| RelayError::host(code, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_cover_reserved_range() {
        assert_eq!(ErrorCode::PrimaryDisplay.as_u16(), 1001);
        assert_eq!(ErrorCode::KeyPress.as_u16(), 1008);
        assert_eq!(ErrorCode::DisplayList.as_u16(), 1016);
    }

    #[test]
    fn test_envelope_carries_code_and_message() {
        let err = RelayError::host(
            ErrorCode::Screenshot,
            HostError::CaptureFailed("no monitor".into()),
        );
        let envelope = err.envelope();
        assert!(envelope.error);
        assert_eq!(envelope.code, 1002);
        assert_eq!(
            envelope.message,
            "Failed to capture screenshot: capture failed: no monitor"
        );
        assert_eq!(
            err.cause_chain().as_deref(),
            Some("caused by: capture failed: no monitor")
        );
    }

    #[test]
    fn test_invalid_has_no_cause_chain() {
        let err = RelayError::invalid(ErrorCode::SwitchScreen, "index 4 out of range");
        assert_eq!(err.code(), ErrorCode::SwitchScreen);
        assert!(err.cause_chain().is_none());
    }
}
