//! The slice of the Xlib / XShm C ABI we shadow.

use libc::{c_char, c_int};

/// Opaque `Display`. Only ever seen behind a pointer.
#[repr(C)]
pub struct Display {
    _private: [u8; 0],
}

/// Xlib `Bool`
pub type Bool = c_int;

pub const FALSE: Bool = 0;
pub const TRUE: Bool = 1;

/// The extension we hide.
pub const SUPPRESSED_EXTENSION: &[u8] = b"MIT-SHM";

/// Written over the head of a listed `MIT-SHM`, giving `No--SHM`.
pub const RENAME_MARKER: [u8; 3] = *b"No-";

pub type XQueryExtensionFn = unsafe extern "C" fn(
    *mut Display,
    *const c_char,
    *mut c_int,
    *mut c_int,
    *mut c_int,
) -> Bool;

pub type XListExtensionsFn = unsafe extern "C" fn(*mut Display, *mut c_int) -> *mut *mut c_char;
