//! Decides, per call, whether to answer for Xlib or hand the call on.

use std::ffi::CStr;

use libc::{c_char, c_int};
use noshm_config::{log_layer_debug, log_layer_warn};

use crate::loader::SymbolSource;
use crate::reals::RealSymbol;
use crate::xlib::{
    Bool, Display, XListExtensionsFn, XQueryExtensionFn, FALSE, RENAME_MARKER,
    SUPPRESSED_EXTENSION,
};

/// Process-wide interposition state: where authentic functions come from and
/// the two cells caching them.
pub struct Interposer<S> {
    source: S,
    query_extension: RealSymbol<XQueryExtensionFn>,
    list_extensions: RealSymbol<XListExtensionsFn>,
}

impl<S> Interposer<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            query_extension: RealSymbol::new(c"XQueryExtension"),
            list_extensions: RealSymbol::new(c"XListExtensions"),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SymbolSource> Interposer<S> {
    /// `XQueryExtension`: `MIT-SHM` is reported absent, everything else is
    /// whatever the real Xlib says.
    ///
    /// # Safety
    /// Same contract as Xlib's `XQueryExtension`. For `MIT-SHM`, `major` is
    /// written unconditionally, exactly as Xlib would.
    pub unsafe fn query_extension(
        &self,
        display: *mut Display,
        name: *const c_char,
        major: *mut c_int,
        event: *mut c_int,
        error: *mut c_int,
    ) -> Bool {
        if is_suppressed(name) {
            log_layer_debug!("Reporting MIT-SHM as absent", call = "XQueryExtension");
            *major = 0;
            return FALSE;
        }

        let real = match self.query_extension.get_or_resolve(&self.source) {
            Ok(real) => real,
            Err(e) => {
                log_layer_warn!(
                    "Authentic XQueryExtension unavailable, answering False",
                    error = tracing::field::display(&e)
                );
                return FALSE;
            }
        };

        real(display, name, major, event, error)
    }

    /// `XListExtensions`: the real list, with any `MIT-SHM` entry renamed in
    /// place.
    ///
    /// # Safety
    /// Same contract as Xlib's `XListExtensions`.
    pub unsafe fn list_extensions(
        &self,
        display: *mut Display,
        count: *mut c_int,
    ) -> *mut *mut c_char {
        let real = match self.list_extensions.get_or_resolve(&self.source) {
            Ok(real) => real,
            Err(e) => {
                log_layer_warn!(
                    "Authentic XListExtensions unavailable, answering with no extensions",
                    error = tracing::field::display(&e)
                );
                *count = 0;
                return std::ptr::null_mut();
            }
        };

        let names = real(display, count);
        if !names.is_null() && *count > 0 {
            rename_suppressed(names, *count as usize);
        }
        names
    }

    /// `XShmQueryExtension`: always `False`.
    pub fn shm_query_extension(&self, _display: *mut Display) -> Bool {
        log_layer_debug!("Reporting MIT-SHM as absent", call = "XShmQueryExtension");
        FALSE
    }

    /// `XShmQueryVersion`: always `False`. The out-slots are left alone.
    pub fn shm_query_version(
        &self,
        _display: *mut Display,
        _major: *mut c_int,
        _minor: *mut c_int,
        _shared_pixmaps: *mut Bool,
    ) -> Bool {
        log_layer_debug!("Reporting MIT-SHM as absent", call = "XShmQueryVersion");
        FALSE
    }
}

/// Exact, case-sensitive match against `MIT-SHM`. Null is never a match.
pub(crate) unsafe fn is_suppressed(name: *const c_char) -> bool {
    !name.is_null() && CStr::from_ptr(name).to_bytes() == SUPPRESSED_EXTENSION
}

/// Overwrite the head of every `MIT-SHM` entry with [`RENAME_MARKER`].
///
/// The strings belong to Xlib's allocator: only same-length writes inside
/// the existing buffer.
unsafe fn rename_suppressed(names: *mut *mut c_char, count: usize) {
    for i in 0..count {
        let name = *names.add(i);
        if !is_suppressed(name) {
            continue;
        }
        std::ptr::copy_nonoverlapping(
            RENAME_MARKER.as_ptr().cast::<c_char>(),
            name,
            RENAME_MARKER.len(),
        );
        log_layer_debug!("Renamed listed extension", index = i as u64);
    }
}
