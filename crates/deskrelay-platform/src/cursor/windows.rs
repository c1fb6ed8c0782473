//! Windows cursor shape via Win32.

use deskrelay_core::{CursorShape, HostError, HostResult};
use std::mem;
use std::ptr;
use windows_sys::core::PCWSTR;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetCursorInfo, LoadCursorW, CURSORINFO, IDC_APPSTARTING, IDC_ARROW, IDC_CROSS, IDC_HAND,
    IDC_IBEAM, IDC_NO, IDC_SIZEALL, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE, IDC_SIZEWE, IDC_WAIT,
};

const STOCK_CURSORS: [(PCWSTR, CursorShape); 12] = [
    (IDC_ARROW, CursorShape::Arrow),
    (IDC_IBEAM, CursorShape::Ibeam),
    (IDC_HAND, CursorShape::Hand),
    (IDC_WAIT, CursorShape::Wait),
    (IDC_APPSTARTING, CursorShape::Wait),
    (IDC_CROSS, CursorShape::Crosshair),
    (IDC_SIZENS, CursorShape::ResizeNs),
    (IDC_SIZEWE, CursorShape::ResizeEw),
    (IDC_SIZENWSE, CursorShape::ResizeNwse),
    (IDC_SIZENESW, CursorShape::ResizeNesw),
    (IDC_SIZEALL, CursorShape::Move),
    (IDC_NO, CursorShape::NotAllowed),
];

pub fn current_cursor_shape() -> HostResult<CursorShape> {
    unsafe {
        let mut info: CURSORINFO = mem::zeroed();
        info.cbSize = mem::size_of::<CURSORINFO>() as u32;
        if GetCursorInfo(&mut info) == 0 {
            return Err(HostError::Unavailable("GetCursorInfo failed".into()));
        }
        if info.hCursor.is_null() {
            return Ok(CursorShape::Unknown);
        }

        for (id, shape) in STOCK_CURSORS {
            if LoadCursorW(ptr::null_mut(), id) == info.hCursor {
                return Ok(shape);
            }
        }
        Ok(CursorShape::Unknown)
    }
}
