//! Error taxonomy and host exception translation
//!
//! Every failure a bridge operation can detect maps to exactly one typed
//! exception the embedder raises in the host VM. Operations return
//! `Result<T, Error>` and abort at the point of detection; there is no local
//! recovery anywhere in this layer.
//!
//! The one special case is [`Error::HostFault`]: a host callback has already
//! recorded a pending exception, so the operation unwinds without touching the
//! host again and the embedder must *not* raise a second exception on top.

use crate::host::{Host, HostFault};

/// Exception class the embedder raises for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    /// A required reference or address argument was absent.
    NullPointer,
    /// Out-of-domain numeric input: negative sizes, malformed limits,
    /// unsupported terminator widths.
    IllegalArgument,
    /// Allocation failure, or a decoded length the host's signed 32-bit
    /// length type cannot represent.
    OutOfMemory,
    /// Dynamic load or symbol resolution failure.
    UnsatisfiedLink,
    /// Library unload failure.
    Unknown,
}

impl ExceptionKind {
    /// Stable name for diagnostics and embedder-side exception mapping.
    pub fn name(&self) -> &'static str {
        match self {
            ExceptionKind::NullPointer => "null_pointer",
            ExceptionKind::IllegalArgument => "illegal_argument",
            ExceptionKind::OutOfMemory => "out_of_memory",
            ExceptionKind::UnsatisfiedLink => "unsatisfied_link",
            ExceptionKind::Unknown => "unknown",
        }
    }
}

/// Bridge operation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Required reference or address argument was null.
    #[error("null pointer")]
    NullPointer,

    /// Numeric input outside the operation's domain.
    #[error("illegal argument")]
    IllegalArgument,

    /// Native allocation failed, or a result length is unrepresentable.
    #[error("out of memory")]
    OutOfMemory,

    /// The platform loader could not open a library or resolve a symbol.
    /// Carries the platform's last-error text.
    #[error("link failure: {0}")]
    UnsatisfiedLink(String),

    /// The platform unloader reported failure.
    #[error("unload failure: {0}")]
    Unknown(String),

    /// The host recorded a pending exception during a callback. The
    /// exception is already raised; the embedder only substitutes the
    /// null/zero sentinel return value.
    #[error("host exception pending")]
    HostFault,
}

impl Error {
    /// Exception class to raise in the host, or `None` when one is already
    /// pending there.
    pub fn kind(&self) -> Option<ExceptionKind> {
        match self {
            Error::NullPointer => Some(ExceptionKind::NullPointer),
            Error::IllegalArgument => Some(ExceptionKind::IllegalArgument),
            Error::OutOfMemory => Some(ExceptionKind::OutOfMemory),
            Error::UnsatisfiedLink(_) => Some(ExceptionKind::UnsatisfiedLink),
            Error::Unknown(_) => Some(ExceptionKind::Unknown),
            Error::HostFault => None,
        }
    }

    /// Detail message attached to the raised exception, when there is one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::UnsatisfiedLink(msg) | Error::Unknown(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<HostFault> for Error {
    fn from(_: HostFault) -> Self {
        Error::HostFault
    }
}

/// Result alias used by every bridge operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Raise a failed operation's exception in the host and collapse the result
/// to an `Option`.
///
/// This is the glue registered entry points call at their outermost layer:
/// on error the mapped exception is raised through [`Host::raise`] (skipped
/// for [`Error::HostFault`], where one is already pending) and `None` comes
/// back so the caller can return its null/zero sentinel. Some host call
/// paths check return values before exceptions, so both signals are kept.
pub fn report<H: Host, T>(host: &H, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            if let Some(kind) = err.kind() {
                host.raise(kind, err.message());
            }
            None
        }
    }
}
