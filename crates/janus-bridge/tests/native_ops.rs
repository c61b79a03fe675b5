//! Integration tests over the host-free surface: raw memory, terminator
//! scans and the dynamic loader, combined the way a managed caller would
//! drive them.

use janus_bridge::{library, memory, strings, Error, OpenMode};

struct Block(u64);
impl Drop for Block {
    fn drop(&mut self) {
        unsafe { memory::free(self.0) };
    }
}

#[test]
fn allocate_write_scan_free() {
    let block = Block(memory::allocate(32).unwrap());
    // Freshly allocated memory is zeroed, so the scan stops immediately.
    assert_eq!(
        unsafe { strings::get_string_length(block.0, -1, 1).unwrap() },
        0
    );

    for (i, b) in b"janus".iter().enumerate() {
        unsafe { memory::put_i8(block.0 + i as u64, *b as i8).unwrap() };
    }
    assert_eq!(
        unsafe { strings::get_string_length(block.0, -1, 1).unwrap() },
        5
    );
    assert_eq!(
        unsafe { strings::get_string_length(block.0, 3, 1).unwrap() },
        3
    );
}

#[test]
fn copy_preserves_terminated_text() {
    let src = Block(memory::allocate(16).unwrap());
    let dst = Block(memory::allocate(16).unwrap());
    for (i, b) in b"abc".iter().enumerate() {
        unsafe { memory::put_i8(src.0 + i as u64, *b as i8).unwrap() };
    }
    unsafe { memory::copy(dst.0, src.0, 4).unwrap() };
    assert_eq!(
        unsafe { strings::get_string_length(dst.0, -1, 1).unwrap() },
        3
    );
}

#[test]
fn scalar_access_across_widths() {
    let block = Block(memory::allocate(32).unwrap());
    unsafe {
        memory::put_i32(block.0, 0x0041_0042).unwrap();
        assert_eq!(memory::get_i32(block.0).unwrap(), 0x0041_0042);
        memory::put_f64(block.0 + 8, 2.5).unwrap();
        assert_eq!(memory::get_f64(block.0 + 8).unwrap(), 2.5);
    }
}

#[test]
fn allocation_argument_errors() {
    assert_eq!(memory::allocate(-4), Err(Error::IllegalArgument));
    assert_eq!(unsafe { memory::get_i64(0) }, Err(Error::NullPointer));
}

#[cfg(unix)]
#[test]
fn resolve_and_call_libc_abs() {
    // End-to-end loader flow: default scope, resolve, call through the
    // returned address.
    struct NoHost;
    impl janus_bridge::Host for NoHost {
        type Str = String;
        type Bytes = std::cell::RefCell<Vec<u8>>;
        type Class = ();
        type Object = ();
        type Buffer = ();

        fn utf8_len(&self, s: &String) -> janus_bridge::HostResult<usize> {
            Ok(s.len())
        }
        fn utf16_len(&self, s: &String) -> janus_bridge::HostResult<usize> {
            Ok(s.encode_utf16().count())
        }
        fn read_utf8(&self, s: &String, dst: &mut [u8]) -> janus_bridge::HostResult<()> {
            dst.copy_from_slice(s.as_bytes());
            Ok(())
        }
        unsafe fn read_utf16(&self, s: &String, dst: *mut u16) -> janus_bridge::HostResult<()> {
            for (i, unit) in s.encode_utf16().enumerate() {
                dst.add(i).write_unaligned(unit);
            }
            Ok(())
        }
        fn new_string_utf8(&self, bytes: &[u8]) -> janus_bridge::HostResult<String> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        unsafe fn new_string_utf16(
            &self,
            units: *const u16,
            len: usize,
        ) -> janus_bridge::HostResult<String> {
            let mut run = Vec::with_capacity(len);
            for i in 0..len {
                run.push(units.add(i).read_unaligned());
            }
            Ok(String::from_utf16_lossy(&run))
        }
        fn bytes_len(&self, b: &Self::Bytes) -> janus_bridge::HostResult<usize> {
            Ok(b.borrow().len())
        }
        unsafe fn pin_bytes(
            &self,
            _b: &Self::Bytes,
        ) -> janus_bridge::HostResult<std::ptr::NonNull<u8>> {
            Err(janus_bridge::HostFault)
        }
        unsafe fn unpin_bytes(
            &self,
            _b: &Self::Bytes,
            _ptr: std::ptr::NonNull<u8>,
            _mode: janus_bridge::ReleaseMode,
        ) {
        }
        fn read_byte_region(
            &self,
            _b: &Self::Bytes,
            _offset: usize,
            _dst: &mut [u8],
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn write_byte_region(
            &self,
            _b: &Self::Bytes,
            _offset: usize,
            _src: &[u8],
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn define_class(
            &self,
            _name: Option<&std::ffi::CStr>,
            _loader: Option<&()>,
            _data: &[u8],
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn find_class(&self, _name: &std::ffi::CStr) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn from_reflected_method(&self, _m: &()) -> janus_bridge::HostResult<janus_bridge::MethodId> {
            Err(janus_bridge::HostFault)
        }
        fn from_reflected_field(&self, _f: &()) -> janus_bridge::HostResult<janus_bridge::FieldId> {
            Err(janus_bridge::HostFault)
        }
        fn to_reflected_method(
            &self,
            _c: &(),
            _id: janus_bridge::MethodId,
            _s: bool,
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn to_reflected_field(
            &self,
            _c: &(),
            _id: janus_bridge::FieldId,
            _s: bool,
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn alloc_instance(&self, _c: &()) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn method_id(
            &self,
            _c: &(),
            _n: &std::ffi::CStr,
            _s: &std::ffi::CStr,
            _st: bool,
        ) -> janus_bridge::HostResult<janus_bridge::MethodId> {
            Err(janus_bridge::HostFault)
        }
        fn field_id(
            &self,
            _c: &(),
            _n: &std::ffi::CStr,
            _s: &std::ffi::CStr,
            _st: bool,
        ) -> janus_bridge::HostResult<janus_bridge::FieldId> {
            Err(janus_bridge::HostFault)
        }
        unsafe fn new_direct_buffer(
            &self,
            _addr: std::ptr::NonNull<u8>,
            _capacity: usize,
        ) -> janus_bridge::HostResult<()> {
            Err(janus_bridge::HostFault)
        }
        fn direct_buffer_address(&self, _b: &()) -> janus_bridge::HostResult<u64> {
            Err(janus_bridge::HostFault)
        }
        fn raise(&self, _kind: janus_bridge::ExceptionKind, _message: Option<&str>) {}
    }

    let host = NoHost;
    let handle = library::open::<NoHost>(&host, None, OpenMode::empty()).unwrap();
    let symbol = String::from("abs");
    let addr = unsafe { library::resolve(&host, handle, Some(&symbol)).unwrap() };
    assert_ne!(addr, 0);

    let abs: extern "C" fn(i32) -> i32 = unsafe { std::mem::transmute(addr as usize) };
    assert_eq!(abs(-42), 42);

    unsafe { library::close(handle).unwrap() };
}
