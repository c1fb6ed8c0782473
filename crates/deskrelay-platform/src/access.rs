//! Screen recording permission check.
//!
//! Only macOS gates screen capture behind a user permission; other platforms
//! always report access.

#[cfg(target_os = "macos")]
pub fn screen_capture_allowed() -> bool {
    #[link(name = "CoreGraphics", kind = "framework")]
    extern "C" {
        fn CGPreflightScreenCaptureAccess() -> bool;
    }

    // Preflight only queries; it never shows the permission prompt.
    unsafe { CGPreflightScreenCaptureAccess() }
}

#[cfg(not(target_os = "macos"))]
pub fn screen_capture_allowed() -> bool {
    true
}
