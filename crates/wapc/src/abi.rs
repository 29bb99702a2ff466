//! The nine `wapc`-namespaced host functions a guest imports, and nothing
//! else: this module holds the engine-agnostic decode/dispatch logic so each
//! engine crate's own `callbacks` module is reduced to "get the caller's
//! memory, call into here".
use crate::context::with_current;
use crate::host::HostCallHandler;
use crate::logger::Logger;

/// What an engine crate must expose over its guest instance's linear memory
/// for the functions in this module to do their work.
///
/// `field_name` identifies the ABI argument being read, purely for the
/// diagnostic message [`crate::memory::read`] panics with on an
/// out-of-bounds request.
pub trait HostMemory {
  /// Reads `len` bytes at `offset`.
  fn read(&self, field_name: &str, offset: u32, len: u32) -> Vec<u8>;
  /// Writes `bytes` at `offset`.
  fn write(&mut self, offset: u32, bytes: &[u8]);
}

fn read_text(mem: &dyn HostMemory, field_name: &str, offset: u32, len: u32) -> String {
  String::from_utf8_lossy(&mem.read(field_name, offset, len)).into_owned()
}

/// `__guest_request(op_ptr, ptr)`
pub fn guest_request(mem: &mut dyn HostMemory, op_ptr: u32, ptr: u32) {
  with_current(|ctx| {
    let operation = ctx.operation();
    if !operation.is_empty() {
      mem.write(op_ptr, operation.as_bytes());
    }
    let request = ctx.guest_request();
    if !request.is_empty() {
      mem.write(ptr, request);
    }
  });
}

/// `__console_log(ptr, len)`
pub fn console_log(mem: &dyn HostMemory, logger: Option<&dyn Logger>, instance_id: u64, ptr: u32, len: u32) {
  if let Some(logger) = logger {
    let message = read_text(mem, "console_log.msg", ptr, len);
    logger.log(instance_id, &message);
  }
}

/// `__host_call(bind_ptr, bind_len, ns_ptr, ns_len, cmd_ptr, cmd_len, payload_ptr, payload_len) -> i32`
#[allow(clippy::too_many_arguments)]
pub fn host_call(
  mem: &mut dyn HostMemory,
  handler: Option<&dyn HostCallHandler>,
  instance_id: u64,
  bind_ptr: u32,
  bind_len: u32,
  ns_ptr: u32,
  ns_len: u32,
  op_ptr: u32,
  op_len: u32,
  payload_ptr: u32,
  payload_len: u32,
) -> u32 {
  let Some(handler) = handler else {
    return 0;
  };
  with_current(|ctx| {
    let binding = read_text(mem, "host_call.binding", bind_ptr, bind_len);
    let namespace = read_text(mem, "host_call.namespace", ns_ptr, ns_len);
    let operation = read_text(mem, "host_call.operation", op_ptr, op_len);
    let payload = mem.read("host_call.payload", payload_ptr, payload_len);
    match handler.host_call(instance_id, &binding, &namespace, &operation, &payload) {
      Ok(response) => {
        ctx.set_host_response(response);
        1
      }
      Err(e) => {
        ctx.set_host_error(e.to_string());
        0
      }
    }
  })
  .unwrap_or(0)
}

/// `__host_response(ptr)`
pub fn host_response(mem: &mut dyn HostMemory, ptr: u32) {
  with_current(|ctx| {
    if let Some(response) = ctx.host_response() {
      mem.write(ptr, &response);
    }
  });
}

/// `__host_response_len() -> i32`
#[must_use]
pub fn host_response_len() -> u32 {
  with_current(|ctx| ctx.host_response().map_or(0, |r| r.len() as u32)).unwrap_or(0)
}

/// `__guest_response(ptr, len)`
pub fn guest_response(mem: &dyn HostMemory, ptr: u32, len: u32) {
  with_current(|ctx| {
    ctx.set_guest_response(mem.read("guest_response", ptr, len));
  });
}

/// `__guest_error(ptr, len)`
pub fn guest_error(mem: &dyn HostMemory, ptr: u32, len: u32) {
  with_current(|ctx| {
    ctx.set_guest_error(read_text(mem, "guest_error", ptr, len));
  });
}

/// `__host_error(ptr)`
pub fn host_error(mem: &mut dyn HostMemory, ptr: u32) {
  with_current(|ctx| {
    if let Some(error) = ctx.host_error() {
      mem.write(ptr, error.as_bytes());
    }
  });
}

/// `__host_error_len() -> i32`
#[must_use]
pub fn host_error_len() -> u32 {
  with_current(|ctx| ctx.host_error().map_or(0, |e| e.len() as u32)).unwrap_or(0)
}
