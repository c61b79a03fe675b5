//! Host service seam
//!
//! The managed runtime's embedding API is an external collaborator. This
//! trait captures exactly the capabilities the bridge consumes from it:
//! string length/region queries, string construction, byte-array pinning,
//! reflection lookups, and exception raising. Everything behind the trait is
//! opaque; the bridge never assumes how the host lays out its heap.
//!
//! # Faulted-host discipline
//!
//! Any host callback may record a pending exception and fail. Such methods
//! return [`HostResult`]; an `Err(HostFault)` means the operation must
//! unwind immediately without issuing further host calls. Propagation is
//! plain `?` — [`HostFault`] converts into [`crate::Error::HostFault`],
//! which the outer [`crate::report`] glue deliberately does not re-raise.

use std::ffi::CStr;
use std::ptr::NonNull;

use crate::error::ExceptionKind;

/// The host recorded a pending exception during a callback.
///
/// Carries no payload: the exception object lives in the host and must not
/// be duplicated or replaced by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFault;

/// Result of a host callback.
pub type HostResult<T> = std::result::Result<T, HostFault>;

/// How a pinned byte-array region is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Write mutations back to the host array.
    Commit,
    /// Discard mutations; the array was input-only.
    Abort,
}

/// Opaque native id of a host method descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u64);

/// Opaque native id of a host field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u64);

/// Capabilities the bridge requires from the managed-runtime host.
///
/// Handle types are associated so a test double can use plain Rust types
/// while a real embedding uses the runtime's local-reference handles.
pub trait Host {
    /// Managed string handle.
    type Str;
    /// Managed byte-array handle.
    type Bytes;
    /// Managed class/type handle.
    type Class;
    /// Managed object reference (reflection descriptors, class loaders).
    type Object;
    /// Managed direct-buffer handle.
    type Buffer;

    // --- strings ---

    /// Encoded (UTF-8) length of the string in bytes, without terminator.
    fn utf8_len(&self, s: &Self::Str) -> HostResult<usize>;

    /// Length of the string in 16-bit code units.
    fn utf16_len(&self, s: &Self::Str) -> HostResult<usize>;

    /// Copy the full UTF-8 encoding into `dst`. `dst.len()` equals the value
    /// reported by [`Host::utf8_len`]; the host writes no terminator.
    fn read_utf8(&self, s: &Self::Str, dst: &mut [u8]) -> HostResult<()>;

    /// Copy all 16-bit units to `dst`, which holds [`Host::utf16_len`] units.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for that many writes. It may be unaligned;
    /// implementations must not assume 2-byte alignment.
    unsafe fn read_utf16(&self, s: &Self::Str, dst: *mut u16) -> HostResult<()>;

    /// Construct a host string from UTF-8 encoded bytes (no terminator).
    fn new_string_utf8(&self, bytes: &[u8]) -> HostResult<Self::Str>;

    /// Construct a host string from a length-delimited run of 16-bit units.
    ///
    /// # Safety
    ///
    /// `units` must be valid for `len` reads. It may be unaligned;
    /// implementations must read unit-by-unit without alignment assumptions.
    unsafe fn new_string_utf16(&self, units: *const u16, len: usize) -> HostResult<Self::Str>;

    // --- byte arrays ---

    /// Element count of a byte array.
    fn bytes_len(&self, b: &Self::Bytes) -> HostResult<usize>;

    /// Pin (or copy) the array's backing storage and return a raw pointer to
    /// it. No forced-copy hint is given; the host chooses.
    ///
    /// # Safety
    ///
    /// The pointer is valid only until the matching [`Host::unpin_bytes`].
    unsafe fn pin_bytes(&self, b: &Self::Bytes) -> HostResult<NonNull<u8>>;

    /// Release a pointer obtained from [`Host::pin_bytes`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `pin_bytes` on the same array, and must not be
    /// used afterwards.
    unsafe fn unpin_bytes(&self, b: &Self::Bytes, ptr: NonNull<u8>, mode: ReleaseMode);

    /// Copy `dst.len()` bytes out of the array starting at `offset`.
    /// Out-of-range regions fault the host.
    fn read_byte_region(&self, b: &Self::Bytes, offset: usize, dst: &mut [u8]) -> HostResult<()>;

    /// Copy `src` into the array starting at `offset`.
    fn write_byte_region(&self, b: &Self::Bytes, offset: usize, src: &[u8]) -> HostResult<()>;

    // --- reflection ---

    /// Define a class from raw class-file bytes under the given loader.
    fn define_class(
        &self,
        name: Option<&CStr>,
        loader: Option<&Self::Object>,
        data: &[u8],
    ) -> HostResult<Self::Class>;

    /// Look up a class by name.
    fn find_class(&self, name: &CStr) -> HostResult<Self::Class>;

    /// Native id of a reflected method descriptor.
    fn from_reflected_method(&self, method: &Self::Object) -> HostResult<MethodId>;

    /// Native id of a reflected field descriptor.
    fn from_reflected_field(&self, field: &Self::Object) -> HostResult<FieldId>;

    /// Reflected descriptor for a native method id.
    fn to_reflected_method(
        &self,
        class: &Self::Class,
        id: MethodId,
        is_static: bool,
    ) -> HostResult<Self::Object>;

    /// Reflected descriptor for a native field id.
    fn to_reflected_field(
        &self,
        class: &Self::Class,
        id: FieldId,
        is_static: bool,
    ) -> HostResult<Self::Object>;

    /// Allocate an uninitialized instance of a class (no constructor runs).
    fn alloc_instance(&self, class: &Self::Class) -> HostResult<Self::Object>;

    /// Resolve a method id by name and signature.
    fn method_id(
        &self,
        class: &Self::Class,
        name: &CStr,
        signature: &CStr,
        is_static: bool,
    ) -> HostResult<MethodId>;

    /// Resolve a field id by name and signature.
    fn field_id(
        &self,
        class: &Self::Class,
        name: &CStr,
        signature: &CStr,
        is_static: bool,
    ) -> HostResult<FieldId>;

    /// Wrap a native region as a host-visible direct buffer.
    ///
    /// # Safety
    ///
    /// `addr` must stay valid for `capacity` bytes for the buffer's lifetime;
    /// the host does not copy or manage the region.
    unsafe fn new_direct_buffer(
        &self,
        addr: NonNull<u8>,
        capacity: usize,
    ) -> HostResult<Self::Buffer>;

    /// Native address backing a direct buffer.
    fn direct_buffer_address(&self, buffer: &Self::Buffer) -> HostResult<u64>;

    // --- exceptions ---

    /// Raise a typed exception in the host. Does not unwind this layer;
    /// callers return their sentinel afterwards.
    fn raise(&self, kind: ExceptionKind, message: Option<&str>);
}
