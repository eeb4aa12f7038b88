//! Exported entry points. The loader binds the application's Xlib calls to
//! these when the layer sits ahead of libX11/libXext in `LD_PRELOAD`.
#![allow(non_snake_case)]

use std::sync::atomic::{AtomicBool, Ordering};

use libc::{c_char, c_int};
use noshm_config::{log_config_warn, log_layer_debug};

use crate::interposer::{is_suppressed, Interposer};
use crate::loader::DlSource;
use crate::xlib::{Bool, Display};

/// The one process-wide interposer.
pub static INTERPOSER: Interposer<DlSource> = Interposer::new(DlSource);

static LOGGING_STARTED: AtomicBool = AtomicBool::new(false);

/// Whether some call has claimed the config/logging bootstrap.
pub fn logging_started() -> bool {
    LOGGING_STARTED.load(Ordering::Acquire)
}

/// The first delegating call loads config and installs the subscriber.
///
/// Only the claiming thread ever forces the config; everyone else, including
/// a re-entrant call on that same thread, returns at once and resolves with
/// whatever `DlSource` can see without waiting. Fixed answers never get here.
fn ensure_logging() {
    if LOGGING_STARTED.load(Ordering::Relaxed) || LOGGING_STARTED.swap(true, Ordering::AcqRel) {
        return;
    }

    let config = noshm_config::config();
    noshm_config::logging::init_logging(&config.logging);
    if let Some(error) = noshm_config::load_error() {
        log_config_warn!("Config file ignored, using defaults", error = error);
    }
    log_layer_debug!(
        "noshm layer active",
        real_library = config.library.real.as_str()
    );
}

#[no_mangle]
pub unsafe extern "C" fn XQueryExtension(
    display: *mut Display,
    name: *const c_char,
    major_opcode: *mut c_int,
    first_event: *mut c_int,
    first_error: *mut c_int,
) -> Bool {
    if !is_suppressed(name) {
        ensure_logging();
    }
    INTERPOSER.query_extension(display, name, major_opcode, first_event, first_error)
}

#[no_mangle]
pub unsafe extern "C" fn XListExtensions(
    display: *mut Display,
    nextensions: *mut c_int,
) -> *mut *mut c_char {
    ensure_logging();
    INTERPOSER.list_extensions(display, nextensions)
}

#[no_mangle]
pub unsafe extern "C" fn XShmQueryExtension(display: *mut Display) -> Bool {
    INTERPOSER.shm_query_extension(display)
}

#[no_mangle]
pub unsafe extern "C" fn XShmQueryVersion(
    display: *mut Display,
    major: *mut c_int,
    minor: *mut c_int,
    shared_pixmaps: *mut Bool,
) -> Bool {
    INTERPOSER.shm_query_version(display, major, minor, shared_pixmaps)
}
