//! Reflection and handle conversion
//!
//! Thin validated pass-throughs between host reflection objects and opaque
//! native ids, plus direct-buffer wrapping. Every nullable reference
//! argument is checked before the first host call; name and signature
//! strings reach the host as narrow C strings through the scoped extractor.

use crate::error::{Error, Result};
use crate::host::{FieldId, Host, MethodId};
use crate::memory::non_null;
use crate::view::{PinnedBytes, Utf8Text};

/// Define a class from raw class-file bytes.
///
/// The content array is pinned for the duration of the call and released
/// without write-back. A null content array is [`Error::NullPointer`]; the
/// name is optional and a bad name encoding propagates as a host fault.
pub fn define_class<H: Host>(
    host: &H,
    name: Option<&H::Str>,
    loader: Option<&H::Object>,
    content: Option<&H::Bytes>,
) -> Result<H::Class> {
    let content = content.ok_or(Error::NullPointer)?;
    let pinned = PinnedBytes::new(host, content)?;
    match name {
        Some(name) => {
            let name = Utf8Text::new(host, name)?;
            Ok(host.define_class(Some(name.as_c_str()), loader, pinned.as_slice())?)
        }
        None => Ok(host.define_class(None, loader, pinned.as_slice())?),
    }
}

/// Look up a class by name.
pub fn find_class<H: Host>(host: &H, name: Option<&H::Str>) -> Result<H::Class> {
    let name = name.ok_or(Error::NullPointer)?;
    let name = Utf8Text::new(host, name)?;
    Ok(host.find_class(name.as_c_str())?)
}

/// Native id of a reflected method descriptor.
pub fn from_reflected_method<H: Host>(host: &H, method: Option<&H::Object>) -> Result<MethodId> {
    let method = method.ok_or(Error::NullPointer)?;
    Ok(host.from_reflected_method(method)?)
}

/// Native id of a reflected field descriptor.
pub fn from_reflected_field<H: Host>(host: &H, field: Option<&H::Object>) -> Result<FieldId> {
    let field = field.ok_or(Error::NullPointer)?;
    Ok(host.from_reflected_field(field)?)
}

/// Reflected descriptor for a native method id.
pub fn to_reflected_method<H: Host>(
    host: &H,
    class: Option<&H::Class>,
    id: MethodId,
    is_static: bool,
) -> Result<H::Object> {
    let class = class.ok_or(Error::NullPointer)?;
    if id.0 == 0 {
        return Err(Error::NullPointer);
    }
    Ok(host.to_reflected_method(class, id, is_static)?)
}

/// Reflected descriptor for a native field id.
pub fn to_reflected_field<H: Host>(
    host: &H,
    class: Option<&H::Class>,
    id: FieldId,
    is_static: bool,
) -> Result<H::Object> {
    let class = class.ok_or(Error::NullPointer)?;
    if id.0 == 0 {
        return Err(Error::NullPointer);
    }
    Ok(host.to_reflected_field(class, id, is_static)?)
}

/// Allocate an uninitialized instance of a class; no constructor runs.
pub fn alloc_instance<H: Host>(host: &H, class: Option<&H::Class>) -> Result<H::Object> {
    let class = class.ok_or(Error::NullPointer)?;
    Ok(host.alloc_instance(class)?)
}

/// Resolve a method id by name and signature.
pub fn method_id<H: Host>(
    host: &H,
    class: Option<&H::Class>,
    name: Option<&H::Str>,
    signature: Option<&H::Str>,
    is_static: bool,
) -> Result<MethodId> {
    let class = class.ok_or(Error::NullPointer)?;
    let name = name.ok_or(Error::NullPointer)?;
    let signature = signature.ok_or(Error::NullPointer)?;
    let name = Utf8Text::new(host, name)?;
    let signature = Utf8Text::new(host, signature)?;
    Ok(host.method_id(class, name.as_c_str(), signature.as_c_str(), is_static)?)
}

/// Resolve a field id by name and signature.
pub fn field_id<H: Host>(
    host: &H,
    class: Option<&H::Class>,
    name: Option<&H::Str>,
    signature: Option<&H::Str>,
    is_static: bool,
) -> Result<FieldId> {
    let class = class.ok_or(Error::NullPointer)?;
    let name = name.ok_or(Error::NullPointer)?;
    let signature = signature.ok_or(Error::NullPointer)?;
    let name = Utf8Text::new(host, name)?;
    let signature = Utf8Text::new(host, signature)?;
    Ok(host.field_id(class, name.as_c_str(), signature.as_c_str(), is_static)?)
}

/// Wrap a native region as a host-visible direct buffer.
///
/// The capacity check comes first: a negative capacity is
/// [`Error::IllegalArgument`] regardless of address validity.
///
/// # Safety
///
/// `addr` must stay valid for `capacity` bytes as long as the buffer is
/// reachable in the host.
pub unsafe fn new_direct_buffer<H: Host>(host: &H, addr: u64, capacity: i64) -> Result<H::Buffer> {
    if capacity < 0 {
        return Err(Error::IllegalArgument);
    }
    let ptr = non_null(addr)?;
    Ok(host.new_direct_buffer(ptr, capacity as usize)?)
}

/// Native address backing a direct buffer.
pub fn direct_buffer_address<H: Host>(host: &H, buffer: Option<&H::Buffer>) -> Result<u64> {
    let buffer = buffer.ok_or(Error::NullPointer)?;
    Ok(host.direct_buffer_address(buffer)?)
}
