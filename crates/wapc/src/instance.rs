use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::context::{bind, InvokeContext};
use crate::errors::Error;
use crate::invocation::Invocation;

type Result<T> = std::result::Result<T, Error>;

/// What an engine-level instantiated module must provide for [`Instance`] to
/// drive the waPC conversation over it.
pub trait EngineInstance: Send + Sync {
  /// Invokes the guest's `__guest_call(op_len, msg_len)` export and returns
  /// its raw `i32` result, widened to `u32`.
  ///
  /// Any engine-level failure (a trap, a host-side panic propagated up)
  /// should come back as `Err`; the caller wraps it with a descriptor
  /// identifying the phase.
  fn guest_call(&mut self, op_len: u32, msg_len: u32) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>>;

  /// The current size, in bytes, of the instance's linear memory.
  fn memory_size(&self) -> u32;
}

/// A live guest with its own linear memory, spawned by [`crate::Module::instantiate`].
///
/// `Instance` holds a non-owning-in-spirit handle into the runtime owned by
/// its parent `Module`: closing the parent invalidates its children. A
/// single instance must not be invoked concurrently by two callers —
/// `__guest_call` operates over one linear memory and the guest's own memory
/// management is not reentrancy-safe — but the core does not enforce this
/// with a lock of its own; it is a caller contract. The internal `Mutex`
/// below exists only to give `invoke` and `memory_size` interior mutability
/// through a shared `&self`, not to arbitrate between concurrent callers.
#[must_use]
pub struct Instance {
  id: u64,
  name: String,
  handle: Mutex<Box<dyn EngineInstance>>,
  closed: AtomicBool,
}

impl std::fmt::Debug for Instance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Instance")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("handle", &"Mutex<Box<dyn EngineInstance>>")
      .field("closed", &self.closed)
      .finish()
  }
}

impl Instance {
  pub(crate) fn new(id: u64, name: String, handle: Box<dyn EngineInstance>) -> Self {
    Instance {
      id,
      name,
      handle: Mutex::new(handle),
      closed: AtomicBool::new(false),
    }
  }

  /// This instance's assigned name: a decimal, 1-based ordinal, unique
  /// within its parent `Module`.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The ordinal backing [`Instance::name`], also the `id` a
  /// [`crate::host::HostCallHandler`] sees for calls originating here.
  #[must_use]
  pub fn id(&self) -> u64 {
    self.id
  }

  /// The current size, in bytes, of this instance's linear memory. Purely
  /// observational.
  #[must_use]
  pub fn memory_size(&self) -> u32 {
    self.handle.lock().memory_size()
  }

  /// Invokes `operation` with `payload` and waits synchronously for the
  /// guest's response or error.
  pub fn invoke(&self, operation: &str, payload: &[u8]) -> Result<Vec<u8>> {
    if self.closed.load(Ordering::Acquire) {
      return Err(Error::Closed("Instance"));
    }

    let invocation = Invocation::new(operation, payload.to_vec());
    let op_len = invocation.operation.len() as u32;
    let msg_len = invocation.msg.len() as u32;
    let ctx = InvokeContext::new(invocation);

    let (call_result, ctx) = bind(ctx, || self.handle.lock().guest_call(op_len, msg_len));

    let status = call_result.map_err(|e| Error::GuestCallFailure(e.to_string()))?;

    // The guest is taken at its word on `guestErr` even if it also reported
    // success.
    if let Some(message) = ctx.guest_error() {
      return Err(Error::GuestCallFailure(message));
    }

    if status == 1 {
      Ok(ctx.guest_response().unwrap_or_default())
    } else {
      Err(Error::GuestCallFailure(format!("call to {operation} was unsuccessful")))
    }
  }

  /// Closes the engine-level instance. Idempotent: a second call is a no-op.
  pub fn close(&self) {
    self.closed.store(true, Ordering::Release);
  }
}
