//! Dynamic loader shim
//!
//! Open/resolve/close over the platform loader, with raw `u64` handles the
//! managed caller owns. No session state lives here beyond the handle value
//! itself. The two platform backends are selected at compile time; each owns
//! its path-text representation (wide on Windows, narrow elsewhere) and its
//! mode-flag translation.
//!
//! Symbols are always decoded as narrow text: platform symbol tables are
//! ASCII/narrow even where paths are wide.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::view::Utf8Text;

bitflags! {
    /// Portable loader mode bits, translated to the platform's native flags.
    ///
    /// An empty mode means the platform default (lazy binding, local
    /// visibility on POSIX; ignored on Windows, which has no equivalent).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u32 {
        /// Resolve symbols on first use.
        const LAZY = 1;
        /// Resolve all symbols at load time.
        const NOW = 1 << 1;
        /// Keep symbols out of the global namespace.
        const LOCAL = 1 << 2;
        /// Publish symbols to subsequently loaded libraries.
        const GLOBAL = 1 << 3;
    }
}

/// Open a dynamic library and return its raw handle.
///
/// `path == None` requests the process's own default/global symbol scope:
/// platforms with a dedicated sentinel for it return that sentinel,
/// otherwise the main program is opened with lazy binding. A load failure is
/// [`Error::UnsatisfiedLink`] carrying the platform's last-error text.
pub fn open<H: Host>(host: &H, path: Option<&H::Str>, mode: OpenMode) -> Result<u64> {
    match path {
        None => platform::default_scope(),
        Some(path) => platform::open(host, path, mode),
    }
}

/// Resolve a symbol's address in an open library.
///
/// A symbol legitimately located at address zero is indistinguishable from a
/// miss under this policy and reports [`Error::UnsatisfiedLink`]; this is a
/// documented limitation, not a bug.
///
/// # Safety
///
/// `handle` must be a handle obtained from [`open`] that has not been
/// closed.
pub unsafe fn resolve<H: Host>(host: &H, handle: u64, symbol: Option<&H::Str>) -> Result<u64> {
    if handle == 0 {
        return Err(Error::NullPointer);
    }
    let symbol = symbol.ok_or(Error::NullPointer)?;
    let name = Utf8Text::new(host, symbol)?;
    platform::resolve(handle, name.as_c_str())
}

/// Close a library handle.
///
/// A null handle is a no-op, as is the default-scope sentinel — the
/// process's own handle is never forwarded to the platform unloader. An
/// unload failure is [`Error::Unknown`].
///
/// # Safety
///
/// A non-null, non-default `handle` must come from [`open`] and must not be
/// closed twice.
pub unsafe fn close(handle: u64) -> Result<()> {
    if handle == 0 || platform::is_default(handle) {
        return Ok(());
    }
    platform::close(handle)
}

// ---------------------------------------------------------------------------
// POSIX backend
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    use std::ffi::{c_void, CStr, OsStr};
    use std::os::raw::c_int;
    use std::os::unix::ffi::OsStrExt;

    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};

    use super::OpenMode;
    use crate::error::{Error, Result};
    use crate::host::Host;
    use crate::view::Utf8Text;

    fn translate(mode: OpenMode) -> c_int {
        if mode.is_empty() {
            return RTLD_LAZY | RTLD_LOCAL;
        }
        let mut flags = 0;
        if mode.contains(OpenMode::LAZY) {
            flags |= RTLD_LAZY;
        }
        if mode.contains(OpenMode::NOW) {
            flags |= RTLD_NOW;
        }
        if mode.contains(OpenMode::LOCAL) {
            flags |= RTLD_LOCAL;
        }
        if mode.contains(OpenMode::GLOBAL) {
            flags |= RTLD_GLOBAL;
        }
        flags
    }

    pub(super) fn default_scope() -> Result<u64> {
        #[cfg(target_os = "android")]
        {
            // Bionic reserves a sentinel for the default scope.
            Ok(libc::RTLD_DEFAULT as usize as u64)
        }
        #[cfg(not(target_os = "android"))]
        {
            let lib = unsafe { Library::open(None::<&OsStr>, RTLD_LAZY) }
                .map_err(|e| Error::UnsatisfiedLink(e.to_string()))?;
            Ok(lib.into_raw() as usize as u64)
        }
    }

    pub(super) fn is_default(handle: u64) -> bool {
        #[cfg(target_os = "android")]
        {
            handle == libc::RTLD_DEFAULT as usize as u64
        }
        #[cfg(not(target_os = "android"))]
        {
            // dlopen(NULL) handles are reference counted here; closing one is
            // legitimate and forwarded.
            let _ = handle;
            false
        }
    }

    pub(super) fn open<H: Host>(host: &H, path: &H::Str, mode: OpenMode) -> Result<u64> {
        let path = Utf8Text::new(host, path)?;
        let filename = OsStr::from_bytes(path.as_c_str().to_bytes());
        let lib = unsafe { Library::open(Some(filename), translate(mode)) }
            .map_err(|e| Error::UnsatisfiedLink(e.to_string()))?;
        Ok(lib.into_raw() as usize as u64)
    }

    pub(super) unsafe fn resolve(handle: u64, symbol: &CStr) -> Result<u64> {
        let lib = Library::from_raw(handle as usize as *mut c_void);
        let looked = lib.get::<*mut c_void>(symbol.to_bytes_with_nul());
        // The handle stays with the caller; relinquish before drop closes it.
        let _ = lib.into_raw();
        match looked {
            Ok(sym) => {
                let addr = *sym as usize as u64;
                if addr == 0 {
                    return Err(Error::UnsatisfiedLink(format!(
                        "symbol {:?} resolved to null",
                        symbol
                    )));
                }
                Ok(addr)
            }
            Err(e) => Err(Error::UnsatisfiedLink(e.to_string())),
        }
    }

    pub(super) unsafe fn close(handle: u64) -> Result<()> {
        let lib = Library::from_raw(handle as usize as *mut c_void);
        lib.close().map_err(|e| Error::Unknown(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Windows backend
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod platform {
    use std::ffi::{c_void, CStr, OsString};
    use std::os::windows::ffi::OsStringExt;

    use libloading::os::windows::Library;
    use once_cell::sync::Lazy;

    use super::OpenMode;
    use crate::error::{Error, Result};
    use crate::host::Host;

    // The module handle of the program executable, resolved once. Closing it
    // must stay a no-op, so every handle is compared against this value.
    static DEFAULT_HANDLE: Lazy<u64> = Lazy::new(|| {
        Library::this()
            .map(|lib| lib.into_raw() as u64)
            .unwrap_or(0)
    });

    pub(super) fn default_scope() -> Result<u64> {
        match *DEFAULT_HANDLE {
            0 => Err(Error::UnsatisfiedLink(String::from(
                "process module handle unavailable",
            ))),
            handle => Ok(handle),
        }
    }

    pub(super) fn is_default(handle: u64) -> bool {
        handle == *DEFAULT_HANDLE
    }

    pub(super) fn open<H: Host>(host: &H, path: &H::Str, _mode: OpenMode) -> Result<u64> {
        // Paths are wide on this platform; the mode bits have no loader
        // equivalent and are ignored.
        let len = host.utf16_len(path)?;
        let mut units = vec![0u16; len];
        unsafe { host.read_utf16(path, units.as_mut_ptr())? };
        let filename = OsString::from_wide(&units);
        let lib = unsafe { Library::new(&filename) }
            .map_err(|e| Error::UnsatisfiedLink(e.to_string()))?;
        Ok(lib.into_raw() as u64)
    }

    pub(super) unsafe fn resolve(handle: u64, symbol: &CStr) -> Result<u64> {
        let lib = Library::from_raw(handle as isize as _);
        let looked = lib.get::<*mut c_void>(symbol.to_bytes_with_nul());
        let _ = lib.into_raw();
        match looked {
            Ok(sym) => {
                let addr = *sym as usize as u64;
                if addr == 0 {
                    return Err(Error::UnsatisfiedLink(format!(
                        "symbol {:?} resolved to null",
                        symbol
                    )));
                }
                Ok(addr)
            }
            Err(e) => Err(Error::UnsatisfiedLink(e.to_string())),
        }
    }

    pub(super) unsafe fn close(handle: u64) -> Result<()> {
        let lib = Library::from_raw(handle as isize as _);
        lib.close().map_err(|e| Error::Unknown(e.to_string()))
    }
}
