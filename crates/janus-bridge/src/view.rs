//! Scoped native views over host arguments
//!
//! A bridge operation that needs raw-pointer access to a host string or byte
//! array extracts a view at the top of the call. Views own (or pin) their
//! backing storage for exactly the duration of the enclosing operation and
//! release it on every exit path, including early unwinds after a host
//! fault. Neither type is cloneable: one extraction, one owner, one release.

use std::ffi::{c_char, CStr};
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::host::{Host, ReleaseMode};

/// Null-terminated UTF-8 copy of a host string, owned for one call.
///
/// Construction queries the encoded length, allocates `len + 1` bytes and
/// copies the encoding followed by a terminating zero. A host fault during
/// the length query or the region copy propagates before anything must be
/// released; an allocation failure is [`Error::OutOfMemory`].
pub struct Utf8Text {
    // Encoded bytes plus trailing NUL.
    buf: Vec<u8>,
}

impl Utf8Text {
    /// Extract the UTF-8 encoding of `s` from the host.
    pub fn new<H: Host>(host: &H, s: &H::Str) -> Result<Self> {
        let len = host.utf8_len(s)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len + 1)
            .map_err(|_| Error::OutOfMemory)?;
        buf.resize(len + 1, 0);
        host.read_utf8(s, &mut buf[..len])?;
        // Some hosts do not terminate region copies.
        buf[len] = 0;
        Ok(Utf8Text { buf })
    }

    /// The text as a C string, up to the first NUL.
    pub fn as_c_str(&self) -> &CStr {
        // The buffer always carries a trailing NUL.
        unsafe { CStr::from_ptr(self.buf.as_ptr().cast::<c_char>()) }
    }

    /// Raw pointer to the terminated bytes, valid while `self` lives.
    pub fn as_ptr(&self) -> *const c_char {
        self.buf.as_ptr().cast()
    }
}

/// Pinned view of a host byte array's backing storage.
///
/// Released with [`ReleaseMode::Abort`] on drop: the array is treated as
/// input-only, so any mutation through the pointer is discarded even on
/// hosts that pin in place.
pub struct PinnedBytes<'a, H: Host> {
    host: &'a H,
    array: &'a H::Bytes,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a, H: Host> PinnedBytes<'a, H> {
    /// Pin `array`'s storage for the duration of the enclosing call.
    pub fn new(host: &'a H, array: &'a H::Bytes) -> Result<Self> {
        let len = host.bytes_len(array)?;
        let ptr = unsafe { host.pin_bytes(array)? };
        Ok(PinnedBytes {
            host,
            array,
            ptr,
            len,
        })
    }

    /// The pinned bytes.
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Element count of the array.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<H: Host> Drop for PinnedBytes<'_, H> {
    fn drop(&mut self) {
        unsafe {
            self.host
                .unpin_bytes(self.array, self.ptr, ReleaseMode::Abort);
        }
    }
}
