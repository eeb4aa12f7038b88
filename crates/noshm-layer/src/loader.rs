//! Where authentic entry points come from.
//!
//! Production code goes through [`DlSource`] (`dlopen` + `dlsym`); tests plug
//! in their own [`SymbolSource`].

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::ptr::NonNull;

use libc::c_void;

use crate::error::{ResolveError, Result};

/// Opaque handle to an opened library.
///
/// Never closed: the authentic functions we hand out live inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryHandle(NonNull<c_void>);

impl LibraryHandle {
    pub fn new(raw: NonNull<c_void>) -> Self {
        Self(raw)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

pub trait SymbolSource {
    /// Open the library holding the authentic implementations.
    fn open_library(&self) -> Result<LibraryHandle>;

    /// Look `symbol` up inside `library`.
    fn lookup(&self, library: LibraryHandle, symbol: &CStr) -> Result<NonNull<c_void>>;

    /// Open, then look up. One full resolution.
    fn resolve(&self, symbol: &CStr) -> Result<NonNull<c_void>> {
        let library = self.open_library()?;
        self.lookup(library, symbol)
    }
}

/// `dlopen`s the configured real library (`libXext.so.6` by default).
#[derive(Debug, Default, Clone, Copy)]
pub struct DlSource;

impl DlSource {
    /// Library to open. Never waits on config loading: until it has
    /// finished, only the environment and the default are consulted.
    pub fn library_name(&self) -> Cow<'static, str> {
        match noshm_config::try_config() {
            Some(config) => Cow::Borrowed(config.library.real.as_str()),
            None => Cow::Owned(noshm_config::Config::from_env().library.real),
        }
    }
}

impl SymbolSource for DlSource {
    fn open_library(&self) -> Result<LibraryHandle> {
        let library = self.library_name();
        let name = CString::new(library.as_ref())
            .map_err(|_| ResolveError::InvalidLibraryName(library.to_string()))?;

        // SAFETY: `name` is a valid C string; the handle is intentionally leaked.
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_LAZY) };
        NonNull::new(handle)
            .map(LibraryHandle::new)
            .ok_or_else(|| ResolveError::LibraryOpen {
                library: library.into_owned(),
                reason: last_dl_error(),
            })
    }

    fn lookup(&self, library: LibraryHandle, symbol: &CStr) -> Result<NonNull<c_void>> {
        // Clear any stale error so a NULL result can be told apart.
        unsafe { libc::dlerror() };
        // SAFETY: `library` came from dlopen and is never closed.
        let ptr = unsafe { libc::dlsym(library.as_ptr(), symbol.as_ptr()) };
        NonNull::new(ptr).ok_or_else(|| ResolveError::SymbolMissing {
            symbol: symbol.to_string_lossy().into_owned(),
            reason: last_dl_error(),
        })
    }
}

/// Text of the last `dl*` failure on this thread.
fn last_dl_error() -> String {
    // SAFETY: dlerror returns NULL or a NUL-terminated string valid until the
    // next dl* call on this thread; we copy it out immediately.
    unsafe {
        let msg = libc::dlerror();
        if msg.is_null() {
            "unknown error".to_string()
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}
