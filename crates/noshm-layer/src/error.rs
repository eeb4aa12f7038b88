use thiserror::Error;

/// Why an authentic entry point could not be found.
///
/// Never reaches the host application: callers turn it into Xlib's own
/// "not supported" answer.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("library name contains a NUL byte: {0:?}")]
    InvalidLibraryName(String),

    #[error("cannot open library: {reason}")]
    LibraryOpen { library: String, reason: String },

    #[error("symbol {symbol} not found: {reason}")]
    SymbolMissing { symbol: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
