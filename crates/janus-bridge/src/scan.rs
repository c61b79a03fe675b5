//! Width-specialized terminator scans over raw native memory
//!
//! Three code-unit widths are supported. Width 1 rides the platform's fast
//! primitives (`strlen`, `memchr`); widths 2 and 4 walk unit-by-unit with
//! unaligned reads, because the caller's address carries no alignment
//! guarantee and word-sized access to an underaligned address is unsafe on
//! some platforms. Each width monomorphizes to its own loop; there is no
//! per-iteration width branch.

use crate::error::{Error, Result};

/// A fixed-width code unit a scan can walk.
///
/// Sealed: the codec dispatch is closed over {2, 4}-byte units, with the
/// 1-byte width handled by the dedicated `narrow_*` primitives below.
pub(crate) trait CodeUnit: Copy + Eq + sealed::Sealed {
    const WIDTH: usize;
    const NUL: Self;

    /// Read the unit at `ptr + index * WIDTH` with no alignment assumption.
    ///
    /// # Safety
    ///
    /// The addressed unit must be valid for reads.
    unsafe fn read(ptr: *const u8, index: usize) -> Self;
}

mod sealed {
    pub(crate) trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

impl CodeUnit for u16 {
    const WIDTH: usize = 2;
    const NUL: Self = 0;

    unsafe fn read(ptr: *const u8, index: usize) -> Self {
        ptr.add(index * Self::WIDTH).cast::<u16>().read_unaligned()
    }
}

impl CodeUnit for u32 {
    const WIDTH: usize = 4;
    const NUL: Self = 0;

    unsafe fn read(ptr: *const u8, index: usize) -> Self {
        ptr.add(index * Self::WIDTH).cast::<u32>().read_unaligned()
    }
}

/// Byte limit argument, decoded.
///
/// `-1` (or any value beyond the native size range) means unbounded; values
/// below `-1` are malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Limit {
    Unbounded,
    Bytes(usize),
}

impl Limit {
    pub(crate) fn parse(limit: i64) -> Result<Self> {
        if limit < -1 {
            return Err(Error::IllegalArgument);
        }
        if limit == -1 || limit as u64 > usize::MAX as u64 {
            return Ok(Limit::Unbounded);
        }
        Ok(Limit::Bytes(limit as usize))
    }
}

/// Byte length up to the first NUL, unbounded.
///
/// # Safety
///
/// `ptr` must point to a NUL-terminated byte sequence.
pub(crate) unsafe fn narrow_len(ptr: *const u8) -> usize {
    libc::strlen(ptr.cast())
}

/// Offset of the first NUL within `limit` bytes, if any.
///
/// # Safety
///
/// `ptr` must be valid for `limit` reads.
pub(crate) unsafe fn narrow_find_nul(ptr: *const u8, limit: usize) -> Option<usize> {
    let hit = libc::memchr(ptr.cast(), 0, limit);
    if hit.is_null() {
        None
    } else {
        Some(hit as usize - ptr as usize)
    }
}

/// Byte length up to the first NUL, capped at `limit`.
///
/// # Safety
///
/// `ptr` must be valid for `limit` reads.
pub(crate) unsafe fn narrow_len_bounded(ptr: *const u8, limit: usize) -> usize {
    narrow_find_nul(ptr, limit).unwrap_or(limit)
}

/// Unit count up to the first NUL unit, unbounded.
///
/// # Safety
///
/// `ptr` must point to a NUL-terminated run of `U` units.
pub(crate) unsafe fn wide_len<U: CodeUnit>(ptr: *const u8) -> usize {
    let mut i = 0;
    while U::read(ptr, i) != U::NUL {
        i += 1;
    }
    i
}

/// Unit count up to the first NUL unit within `byte_limit` bytes.
///
/// The cap is `byte_limit / WIDTH` whole units; a trailing partial unit is
/// never read.
///
/// # Safety
///
/// `ptr` must be valid for `byte_limit / WIDTH` unit reads.
pub(crate) unsafe fn wide_len_bounded<U: CodeUnit>(ptr: *const u8, byte_limit: usize) -> usize {
    let cap = byte_limit / U::WIDTH;
    let mut i = 0;
    while i < cap && U::read(ptr, i) != U::NUL {
        i += 1;
    }
    i
}
