//! Every `__*` host import is a defined, inert no-op when invoked while no
//! `Invoke` is bound on the calling thread.
//!
//! These drive `wapc::abi` directly (no engine involved) because the point
//! being tested is the ambient-context binding itself, not any one engine's
//! wiring of it.
use std::cell::RefCell;

use wapc::abi::{self, HostMemory};

#[derive(Default)]
struct FakeMemory {
  bytes: RefCell<Vec<u8>>,
}

impl FakeMemory {
  fn new(size: usize) -> Self {
    FakeMemory {
      bytes: RefCell::new(vec![0xAA; size]),
    }
  }
}

impl HostMemory for FakeMemory {
  fn read(&self, _field_name: &str, offset: u32, len: u32) -> Vec<u8> {
    let start = offset as usize;
    self.bytes.borrow()[start..start + len as usize].to_vec()
  }

  fn write(&mut self, offset: u32, bytes: &[u8]) {
    let start = offset as usize;
    self.bytes.get_mut()[start..start + bytes.len()].copy_from_slice(bytes);
  }
}

#[test]
fn host_call_outside_invoke_returns_zero_without_side_effects() {
  let mut mem = FakeMemory::new(64);
  let result = abi::host_call(&mut mem, None, 1, 0, 0, 0, 0, 0, 0, 0, 0);
  assert_eq!(result, 0);
}

#[test]
fn host_response_len_and_error_len_are_zero_outside_invoke() {
  assert_eq!(abi::host_response_len(), 0);
  assert_eq!(abi::host_error_len(), 0);
}

#[test]
fn guest_request_outside_invoke_writes_nothing() {
  let mut mem = FakeMemory::new(64);
  let before = mem.read("probe", 0, 64);
  abi::guest_request(&mut mem, 0, 32);
  let after = mem.read("probe", 0, 64);
  assert_eq!(before, after);
}

#[test]
fn guest_response_and_error_outside_invoke_are_inert() {
  let mem = FakeMemory::new(64);
  // Neither call should panic nor touch any ambient state; there is none to
  // observe here other than the absence of a crash.
  abi::guest_response(&mem, 0, 4);
  abi::guest_error(&mem, 0, 4);
}

#[test]
fn host_response_and_error_outside_invoke_write_nothing() {
  let mut mem = FakeMemory::new(64);
  let before = mem.read("probe", 0, 64);
  abi::host_response(&mut mem, 0);
  abi::host_error(&mut mem, 0);
  let after = mem.read("probe", 0, 64);
  assert_eq!(before, after);
}
