//! Raw memory operations
//!
//! Thin validated forwarding to the platform heap: allocate (zero-filled),
//! copy, free, plus unaligned scalar access and byte-region transfer between
//! native memory and host byte arrays. Addresses travel as `u64`, the host's
//! canonical representation; `0` is the universal null sentinel.
//!
//! Allocation goes through `libc::malloc`/`libc::free` rather than the Rust
//! global allocator so addresses interoperate with blocks allocated by
//! foreign code the managed caller also talks to.

use std::ffi::c_void;
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::host::Host;

/// Validate a native address, rejecting the null sentinel.
pub(crate) fn non_null(addr: u64) -> Result<NonNull<u8>> {
    NonNull::new(addr as *mut u8).ok_or(Error::NullPointer)
}

/// Allocate `size` bytes of zero-filled native memory.
///
/// A negative size is [`Error::IllegalArgument`]; a size the native size
/// type cannot represent, or an allocation failure, is
/// [`Error::OutOfMemory`]. Size `0` is remapped to `1`: `malloc(0)` may
/// legitimately return null on some platforms, which would be
/// indistinguishable from failure.
pub fn allocate(size: i64) -> Result<u64> {
    if size < 0 {
        return Err(Error::IllegalArgument);
    }
    if size as u64 > usize::MAX as u64 {
        return Err(Error::OutOfMemory);
    }
    let size = (size as usize).max(1);
    let ptr = unsafe { libc::malloc(size) };
    if ptr.is_null() {
        return Err(Error::OutOfMemory);
    }
    unsafe { std::ptr::write_bytes(ptr.cast::<u8>(), 0, size) };
    Ok(ptr as u64)
}

/// Copy `n` bytes from `src` to `dst`.
///
/// Overlapping regions are the caller's undefined behavior; this is raw
/// memcpy semantics, not an overlap-safe move.
///
/// # Safety
///
/// Both regions must be valid for `n` bytes and must not overlap.
pub unsafe fn copy(dst: u64, src: u64, n: i64) -> Result<()> {
    if n < 0 || n as u64 > usize::MAX as u64 {
        return Err(Error::IllegalArgument);
    }
    let dst = non_null(dst)?;
    let src = non_null(src)?;
    std::ptr::copy_nonoverlapping(src.as_ptr().cast_const(), dst.as_ptr(), n as usize);
    Ok(())
}

/// Release a block back to the native heap. Freeing the null sentinel is a
/// silent no-op. No double-free protection: each address is freed at most
/// once, on the caller's guarantee.
///
/// # Safety
///
/// A non-null `addr` must have come from [`allocate`] (or a compatible
/// `malloc`) and must not have been freed before.
pub unsafe fn free(addr: u64) {
    if addr != 0 {
        libc::free(addr as *mut c_void);
    }
}

macro_rules! raw_scalar {
    ($(#[$doc:meta])* $get:ident, $put:ident, $ty:ty) => {
        $(#[$doc])*
        ///
        /// # Safety
        ///
        /// The address must be valid for an access of this scalar's size.
        /// No alignment is required.
        pub unsafe fn $get(addr: u64) -> Result<$ty> {
            let ptr = non_null(addr)?;
            Ok(ptr.as_ptr().cast::<$ty>().read_unaligned())
        }

        /// Store counterpart of the matching load.
        ///
        /// # Safety
        ///
        /// The address must be valid for an access of this scalar's size.
        /// No alignment is required.
        pub unsafe fn $put(addr: u64, value: $ty) -> Result<()> {
            let ptr = non_null(addr)?;
            ptr.as_ptr().cast::<$ty>().write_unaligned(value);
            Ok(())
        }
    };
}

raw_scalar!(
    /// Load a byte at `addr`.
    get_i8, put_i8, i8
);
raw_scalar!(
    /// Load a 16-bit integer at `addr`.
    get_i16, put_i16, i16
);
raw_scalar!(
    /// Load a 32-bit integer at `addr`.
    get_i32, put_i32, i32
);
raw_scalar!(
    /// Load a 64-bit integer at `addr`.
    get_i64, put_i64, i64
);
raw_scalar!(
    /// Load a 32-bit float at `addr`.
    get_f32, put_f32, f32
);
raw_scalar!(
    /// Load a 64-bit float at `addr`.
    get_f64, put_f64, f64
);

/// Load a pointer-sized address stored at `addr`, widened to 64 bits.
///
/// # Safety
///
/// The address must be valid for a pointer-sized read; no alignment needed.
pub unsafe fn get_address(addr: u64) -> Result<u64> {
    let ptr = non_null(addr)?;
    Ok(ptr.as_ptr().cast::<usize>().read_unaligned() as u64)
}

/// Store a 64-bit value as a pointer-sized address at `addr`, truncating on
/// 32-bit targets.
///
/// # Safety
///
/// The address must be valid for a pointer-sized write; no alignment needed.
pub unsafe fn put_address(addr: u64, value: u64) -> Result<()> {
    let ptr = non_null(addr)?;
    ptr.as_ptr().cast::<usize>().write_unaligned(value as usize);
    Ok(())
}

/// Copy `len` bytes from native memory at `addr` into a host byte array at
/// `offset`. The host validates the array region and faults on overflow.
///
/// # Safety
///
/// `addr` must be valid for `len` reads.
pub unsafe fn get_bytes<H: Host>(
    host: &H,
    addr: u64,
    array: Option<&H::Bytes>,
    offset: i32,
    len: i32,
) -> Result<()> {
    let ptr = non_null(addr)?;
    let array = array.ok_or(Error::NullPointer)?;
    if offset < 0 || len < 0 {
        return Err(Error::IllegalArgument);
    }
    let src = std::slice::from_raw_parts(ptr.as_ptr().cast_const(), len as usize);
    host.write_byte_region(array, offset as usize, src)?;
    Ok(())
}

/// Copy `len` bytes from a host byte array at `offset` into native memory at
/// `addr`.
///
/// # Safety
///
/// `addr` must be valid for `len` writes.
pub unsafe fn put_bytes<H: Host>(
    host: &H,
    addr: u64,
    array: Option<&H::Bytes>,
    offset: i32,
    len: i32,
) -> Result<()> {
    let ptr = non_null(addr)?;
    let array = array.ok_or(Error::NullPointer)?;
    if offset < 0 || len < 0 {
        return Err(Error::IllegalArgument);
    }
    let dst = std::slice::from_raw_parts_mut(ptr.as_ptr(), len as usize);
    host.read_byte_region(array, offset as usize, dst)?;
    Ok(())
}
