//! String codec core
//!
//! Pointer-addressed text moves between native memory and the host in three
//! code-unit widths. Decodes take a byte limit: `0` yields the empty string,
//! `-1` (or anything beyond the native size range) means unbounded, values
//! below `-1` are malformed, and a positive limit caps the scan — text is
//! never decoded past it, terminator or not.
//!
//! Two overlong-result policies coexist deliberately:
//! [`get_string_length`] *clamps* to `i32::MAX` (it is a saturating length
//! query), while [`get_string_utf16`] *fails* with out-of-memory (it must
//! actually construct a host string, whose length type cannot express the
//! run). Do not unify them.

use crate::error::{Error, Result};
use crate::host::Host;
use crate::memory::non_null;
use crate::scan::{self, Limit};

/// Encoded (UTF-8) length of a host string, for sizing native buffers.
pub fn get_string_utf8_length<H: Host>(host: &H, value: Option<&H::Str>) -> Result<i32> {
    let value = value.ok_or(Error::NullPointer)?;
    let len = host.utf8_len(value)?;
    Ok(i32::try_from(len).unwrap_or(i32::MAX))
}

/// Decode narrow (UTF-8) text at `addr`, bounded by `limit` bytes.
///
/// With a positive limit, the terminated prefix is decoded when a NUL falls
/// inside the cap; otherwise exactly `limit` bytes are decoded.
///
/// # Safety
///
/// `addr` must be readable up to the limit, or up to and including the
/// terminator for unbounded decodes.
pub unsafe fn get_string_utf8<H: Host>(host: &H, addr: u64, limit: i64) -> Result<H::Str> {
    let ptr = non_null(addr)?;
    if limit == 0 {
        return Ok(host.new_string_utf8(&[])?);
    }
    let p = ptr.as_ptr().cast_const();
    let len = match Limit::parse(limit)? {
        Limit::Unbounded => scan::narrow_len(p),
        Limit::Bytes(cap) => scan::narrow_find_nul(p, cap).unwrap_or(cap),
    };
    let bytes = std::slice::from_raw_parts(p, len);
    Ok(host.new_string_utf8(bytes)?)
}

/// Decode 16-bit text at `addr`, bounded by `limit` bytes.
///
/// A unit count above `i32::MAX` is [`Error::OutOfMemory`]: the host string
/// constructor cannot express a longer length.
///
/// # Safety
///
/// `addr` must be readable for the scanned run; no alignment is required.
pub unsafe fn get_string_utf16<H: Host>(host: &H, addr: u64, limit: i64) -> Result<H::Str> {
    let ptr = non_null(addr)?;
    if limit == 0 {
        return Ok(host.new_string_utf8(&[])?);
    }
    let p = ptr.as_ptr().cast_const();
    let len = match Limit::parse(limit)? {
        Limit::Unbounded => scan::wide_len::<u16>(p),
        Limit::Bytes(cap) => scan::wide_len_bounded::<u16>(p, cap),
    };
    if len > i32::MAX as usize {
        return Err(Error::OutOfMemory);
    }
    Ok(host.new_string_utf16(p.cast::<u16>(), len)?)
}

/// Terminator-scan length at `addr` for a code-unit width of 1, 2 or 4
/// bytes, clamped to `i32::MAX`.
///
/// Any other width is [`Error::IllegalArgument`].
///
/// # Safety
///
/// `addr` must be readable for the scanned run; no alignment is required.
pub unsafe fn get_string_length(addr: u64, limit: i64, terminator_width: i32) -> Result<i32> {
    let ptr = non_null(addr)?;
    let limit = Limit::parse(limit)?;
    let p = ptr.as_ptr().cast_const();
    let len = match terminator_width {
        1 => match limit {
            Limit::Unbounded => scan::narrow_len(p),
            Limit::Bytes(cap) => scan::narrow_len_bounded(p, cap),
        },
        2 => match limit {
            Limit::Unbounded => scan::wide_len::<u16>(p),
            Limit::Bytes(cap) => scan::wide_len_bounded::<u16>(p, cap),
        },
        4 => match limit {
            Limit::Unbounded => scan::wide_len::<u32>(p),
            Limit::Bytes(cap) => scan::wide_len_bounded::<u32>(p, cap),
        },
        _ => return Err(Error::IllegalArgument),
    };
    Ok(len.min(i32::MAX as usize) as i32)
}

/// Encode a host string as terminated UTF-8 at `addr`.
///
/// No destination size is supplied, so no bounds check is possible: the
/// caller guarantees capacity for the encoded length plus one byte.
///
/// # Safety
///
/// `addr` must be writable for `utf8_len + 1` bytes.
pub unsafe fn put_string_utf8<H: Host>(host: &H, addr: u64, value: Option<&H::Str>) -> Result<()> {
    let ptr = non_null(addr)?;
    let value = value.ok_or(Error::NullPointer)?;
    let len = host.utf8_len(value)?;
    let dst = std::slice::from_raw_parts_mut(ptr.as_ptr(), len);
    host.read_utf8(value, dst)?;
    ptr.as_ptr().add(len).write(0);
    Ok(())
}

/// Encode a host string as a terminated 16-bit unit run at `addr`.
///
/// # Safety
///
/// `addr` must be writable for `utf16_len + 1` units; no alignment is
/// required.
pub unsafe fn put_string_utf16<H: Host>(host: &H, addr: u64, value: Option<&H::Str>) -> Result<()> {
    let ptr = non_null(addr)?;
    let value = value.ok_or(Error::NullPointer)?;
    let len = host.utf16_len(value)?;
    let dst = ptr.as_ptr().cast::<u16>();
    host.read_utf16(value, dst)?;
    dst.add(len).write_unaligned(0);
    Ok(())
}
