//! In-crate host double for unit tests
//!
//! Implements [`Host`] over plain Rust types: strings are `String`, byte
//! arrays are `RefCell<Vec<u8>>` (pinned as a discarded copy, matching abort
//! release semantics), and reflection handles are small value types with
//! deterministic ids. Raised exceptions are recorded for assertions.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::ffi::CStr;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;

use crate::error::ExceptionKind;
use crate::host::{FieldId, Host, HostFault, HostResult, MethodId, ReleaseMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TClass(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TObject {
    Method { id: u64, is_static: bool },
    Field { id: u64, is_static: bool },
    Instance(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TBuffer {
    pub addr: u64,
    pub capacity: usize,
}

pub(crate) struct TestHost {
    raised: RefCell<Vec<(ExceptionKind, Option<String>)>>,
    pins: Cell<usize>,
    unpins: Cell<usize>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        TestHost {
            raised: RefCell::new(Vec::new()),
            pins: Cell::new(0),
            unpins: Cell::new(0),
        }
    }

    pub(crate) fn raised(&self) -> Vec<(ExceptionKind, Option<String>)> {
        self.raised.borrow().clone()
    }

    pub(crate) fn pin_count(&self) -> usize {
        self.pins.get()
    }

    pub(crate) fn unpin_count(&self) -> usize {
        self.unpins.get()
    }
}

fn descriptor_id(class: &str, name: &CStr, signature: &CStr, is_static: bool, tag: u8) -> u64 {
    let mut hasher = DefaultHasher::new();
    (class, name, signature, is_static, tag).hash(&mut hasher);
    // Ids are opaque native pointers in a real host; keep them non-null.
    hasher.finish() | 1
}

impl Host for TestHost {
    type Str = String;
    type Bytes = RefCell<Vec<u8>>;
    type Class = TClass;
    type Object = TObject;
    type Buffer = TBuffer;

    fn utf8_len(&self, s: &String) -> HostResult<usize> {
        Ok(s.len())
    }

    fn utf16_len(&self, s: &String) -> HostResult<usize> {
        Ok(s.encode_utf16().count())
    }

    fn read_utf8(&self, s: &String, dst: &mut [u8]) -> HostResult<()> {
        dst.copy_from_slice(s.as_bytes());
        Ok(())
    }

    unsafe fn read_utf16(&self, s: &String, dst: *mut u16) -> HostResult<()> {
        for (i, unit) in s.encode_utf16().enumerate() {
            dst.add(i).write_unaligned(unit);
        }
        Ok(())
    }

    fn new_string_utf8(&self, bytes: &[u8]) -> HostResult<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    unsafe fn new_string_utf16(&self, units: *const u16, len: usize) -> HostResult<String> {
        let mut run = Vec::with_capacity(len);
        for i in 0..len {
            run.push(units.add(i).read_unaligned());
        }
        Ok(String::from_utf16_lossy(&run))
    }

    fn bytes_len(&self, b: &RefCell<Vec<u8>>) -> HostResult<usize> {
        Ok(b.borrow().len())
    }

    unsafe fn pin_bytes(&self, b: &RefCell<Vec<u8>>) -> HostResult<NonNull<u8>> {
        // Copying pin: write-back would be lost, which abort release discards
        // anyway.
        let copy = b.borrow().clone().into_boxed_slice();
        self.pins.set(self.pins.get() + 1);
        let ptr = Box::into_raw(copy).cast::<u8>();
        Ok(NonNull::new(ptr).expect("boxed slice pointer is never null"))
    }

    unsafe fn unpin_bytes(&self, b: &RefCell<Vec<u8>>, ptr: NonNull<u8>, _mode: ReleaseMode) {
        self.unpins.set(self.unpins.get() + 1);
        let len = b.borrow().len();
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            ptr.as_ptr(),
            len,
        )));
    }

    fn read_byte_region(&self, b: &RefCell<Vec<u8>>, offset: usize, dst: &mut [u8]) -> HostResult<()> {
        let bytes = b.borrow();
        let end = offset.checked_add(dst.len()).ok_or(HostFault)?;
        if end > bytes.len() {
            return Err(HostFault);
        }
        dst.copy_from_slice(&bytes[offset..end]);
        Ok(())
    }

    fn write_byte_region(&self, b: &RefCell<Vec<u8>>, offset: usize, src: &[u8]) -> HostResult<()> {
        let mut bytes = b.borrow_mut();
        let end = offset.checked_add(src.len()).ok_or(HostFault)?;
        if end > bytes.len() {
            return Err(HostFault);
        }
        bytes[offset..end].copy_from_slice(src);
        Ok(())
    }

    fn define_class(
        &self,
        name: Option<&CStr>,
        _loader: Option<&TObject>,
        data: &[u8],
    ) -> HostResult<TClass> {
        if data.is_empty() {
            return Err(HostFault);
        }
        let name = name
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("<anonymous>"));
        Ok(TClass(name))
    }

    fn find_class(&self, name: &CStr) -> HostResult<TClass> {
        Ok(TClass(name.to_string_lossy().into_owned()))
    }

    fn from_reflected_method(&self, method: &TObject) -> HostResult<MethodId> {
        match method {
            TObject::Method { id, .. } => Ok(MethodId(*id)),
            _ => Err(HostFault),
        }
    }

    fn from_reflected_field(&self, field: &TObject) -> HostResult<FieldId> {
        match field {
            TObject::Field { id, .. } => Ok(FieldId(*id)),
            _ => Err(HostFault),
        }
    }

    fn to_reflected_method(
        &self,
        _class: &TClass,
        id: MethodId,
        is_static: bool,
    ) -> HostResult<TObject> {
        Ok(TObject::Method { id: id.0, is_static })
    }

    fn to_reflected_field(
        &self,
        _class: &TClass,
        id: FieldId,
        is_static: bool,
    ) -> HostResult<TObject> {
        Ok(TObject::Field { id: id.0, is_static })
    }

    fn alloc_instance(&self, class: &TClass) -> HostResult<TObject> {
        Ok(TObject::Instance(class.0.clone()))
    }

    fn method_id(
        &self,
        class: &TClass,
        name: &CStr,
        signature: &CStr,
        is_static: bool,
    ) -> HostResult<MethodId> {
        Ok(MethodId(descriptor_id(&class.0, name, signature, is_static, 0)))
    }

    fn field_id(
        &self,
        class: &TClass,
        name: &CStr,
        signature: &CStr,
        is_static: bool,
    ) -> HostResult<FieldId> {
        Ok(FieldId(descriptor_id(&class.0, name, signature, is_static, 1)))
    }

    unsafe fn new_direct_buffer(&self, addr: NonNull<u8>, capacity: usize) -> HostResult<TBuffer> {
        Ok(TBuffer {
            addr: addr.as_ptr() as u64,
            capacity,
        })
    }

    fn direct_buffer_address(&self, buffer: &TBuffer) -> HostResult<u64> {
        Ok(buffer.addr)
    }

    fn raise(&self, kind: ExceptionKind, message: Option<&str>) {
        self.raised
            .borrow_mut()
            .push((kind, message.map(str::to_owned)));
    }
}
