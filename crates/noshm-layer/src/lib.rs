//! # noshm-layer
//!
//! `LD_PRELOAD` layer that hides the `MIT-SHM` X extension.
//!
//! Some X servers advertise `MIT-SHM` over connections where shared memory
//! cannot work (ssh forwarding, containers sharing the host display), and
//! some clients believe them. With this layer preloaded the client sees:
//!
//! - `XQueryExtension("MIT-SHM", ..)` → `False`, major opcode `0`
//! - `XListExtensions` → `MIT-SHM` renamed in place to `No--SHM`
//! - `XShmQueryExtension` / `XShmQueryVersion` → `False`
//!
//! Every other extension query goes to the real Xlib, found lazily through
//! `dlopen`/`dlsym` and cached for the life of the process.
//!
//! ## Usage
//!
//! ```bash
//! LD_PRELOAD=/path/to/libnoshm_layer.so firefox
//! ```
//!
//! ## Environment Variables
//!
//! - `NOSHM_REAL_LIBRARY`: library holding the authentic symbols (default: `libXext.so.6`)
//! - `NOSHM_LOG`: `EnvFilter` directive, e.g. `debug`
//! - `NOSHM_LOG_LEVEL` / `NOSHM_LOG_FILE`: configured level and log file
//! - `NOSHM_CONFIG`: config file (default: `~/.noshm/config.toml`)

#![allow(clippy::missing_safety_doc)]

pub mod error;
pub mod interpose;
pub mod interposer;
pub mod loader;
pub mod reals;
pub mod xlib;

pub use error::ResolveError;
pub use interpose::*;
pub use interposer::Interposer;
pub use loader::{DlSource, LibraryHandle, SymbolSource};
