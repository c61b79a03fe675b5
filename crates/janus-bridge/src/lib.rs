//! Janus Bridge - native bridge layer for a managed-runtime host
//!
//! This library implements the native half of a managed runtime's low-level
//! escape hatch:
//! - Raw heap allocation, copy, zero-fill and free over `u64` addresses
//! - Pointer-addressed string encoding/decoding for 1/2/4-byte code units,
//!   with bounded and unbounded terminator scans
//! - Dynamic library open/resolve/close with portable mode flags
//! - Reflection-handle conversion and direct-buffer wrapping
//!
//! The managed runtime itself stays behind the [`Host`] trait; every
//! operation is a synchronous, independently reentrant call that extracts
//! any scoped views it needs, validates arguments, performs the native
//! operation and releases its resources on every exit path. Failures are
//! typed [`Error`] values the embedder raises as host exceptions via
//! [`report`].

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod error;
pub mod host;
pub mod library;
pub mod memory;
pub mod reflect;
pub mod strings;
pub mod view;

// Width-specialized scan core
mod scan;

// Host double (only available in test builds)
#[cfg(test)]
pub(crate) mod testhost;

// Re-export commonly used types
pub use error::{report, Error, ExceptionKind, Result};
pub use host::{FieldId, Host, HostFault, HostResult, MethodId, ReleaseMode};
pub use library::OpenMode;
pub use view::{PinnedBytes, Utf8Text};
