//! Real Symbol Storage
//!
//! One [`RealSymbol`] per delegating entry point holds the authentic function
//! once it has been found.
//!
//! Publish-once, lock-free: a caller that finds the cell empty resolves on its
//! own, then publishes with a compare-and-set against null. A racer that lost
//! adopts the winner's pointer, so every caller sees one value for the rest of
//! the process. Nothing here blocks, so re-entry from a signal handler or from
//! under Xlib's display lock cannot deadlock. A failed resolution publishes
//! nothing and the next call tries again.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use libc::c_void;

use crate::error::Result;
use crate::loader::SymbolSource;

pub struct RealSymbol<F> {
    ptr: AtomicPtr<c_void>,
    name: &'static CStr,
    _fn: PhantomData<F>,
}

impl<F: Copy> RealSymbol<F> {
    pub const fn new(name: &'static CStr) -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            name,
            _fn: PhantomData,
        }
    }

    pub fn name(&self) -> &'static CStr {
        self.name
    }

    pub fn is_resolved(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }

    /// The cached function, resolving through `source` on first use.
    ///
    /// # Safety
    /// `F` must be an `extern "C" fn` pointer type matching the real
    /// signature of the symbol this cell names.
    pub unsafe fn get_or_resolve<S: SymbolSource + ?Sized>(&self, source: &S) -> Result<F> {
        let p = self.ptr.load(Ordering::Acquire);
        if !p.is_null() {
            return Ok(Self::cast(p));
        }
        self.resolve_slow(source)
    }

    #[cold]
    unsafe fn resolve_slow<S: SymbolSource + ?Sized>(&self, source: &S) -> Result<F> {
        let resolved = source.resolve(self.name)?.as_ptr();

        match self.ptr.compare_exchange(
            ptr::null_mut(),
            resolved,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                noshm_config::log_layer_debug!(
                    "Resolved authentic symbol",
                    symbol = tracing::field::display(self.name.to_string_lossy())
                );
                Ok(Self::cast(resolved))
            }
            Err(winner) => Ok(Self::cast(winner)),
        }
    }

    unsafe fn cast(p: *mut c_void) -> F {
        debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*mut c_void>());
        mem::transmute_copy(&p)
    }
}
