//! The per-call invocation context and its ambient, thread-local binding.
//!
//! The guest ABI functions in [`crate::abi`] have fixed, narrow `i32`
//! signatures dictated by WebAssembly itself, so the context of the call
//! currently in flight cannot be threaded through as an explicit argument.
//! Instead it is bound to a thread-local slot for the duration of a single
//! `__guest_call` dispatch, the same way host runtimes built around a
//! synchronous, single-threaded guest call (e.g. `lucet-runtime`) bind their
//! own per-call state to the calling thread.
use std::cell::RefCell;

use crate::Invocation;

/// Per-call scratch state: the operation and request the guest pulls via
/// `__guest_request`, and the four message slots later calls fill in.
///
/// Exactly one `InvokeContext` exists per [`crate::Instance::invoke`] call; it
/// is constructed on entry and discarded on return. Only the thread running
/// that call ever touches it, so interior mutability is provided with a
/// plain [`RefCell`] rather than a lock.
#[derive(Debug, Default)]
pub struct InvokeContext {
  operation: String,
  guest_req: Vec<u8>,
  guest_resp: RefCell<Option<Vec<u8>>>,
  guest_err: RefCell<Option<String>>,
  host_resp: RefCell<Option<Vec<u8>>>,
  host_err: RefCell<Option<String>>,
}

impl InvokeContext {
  pub(crate) fn new(invocation: Invocation) -> Self {
    InvokeContext {
      operation: invocation.operation,
      guest_req: invocation.msg,
      guest_resp: RefCell::new(None),
      guest_err: RefCell::new(None),
      host_resp: RefCell::new(None),
      host_err: RefCell::new(None),
    }
  }

  /// The operation name for this call.
  #[must_use]
  pub fn operation(&self) -> &str {
    &self.operation
  }

  /// The request payload for this call.
  #[must_use]
  pub fn guest_request(&self) -> &[u8] {
    &self.guest_req
  }

  /// Records the final response set by the guest via `__guest_response`.
  pub fn set_guest_response(&self, response: Vec<u8>) {
    *self.guest_resp.borrow_mut() = Some(response);
  }

  /// Records the final error set by the guest via `__guest_error`.
  pub fn set_guest_error(&self, error: String) {
    *self.guest_err.borrow_mut() = Some(error);
  }

  /// The guest response, if one was set.
  #[must_use]
  pub fn guest_response(&self) -> Option<Vec<u8>> {
    self.guest_resp.borrow().clone()
  }

  /// The guest error, if one was set.
  #[must_use]
  pub fn guest_error(&self) -> Option<String> {
    self.guest_err.borrow().clone()
  }

  /// Records a successful `HostCallHandler` result for the most recent `__host_call`.
  pub fn set_host_response(&self, response: Vec<u8>) {
    *self.host_resp.borrow_mut() = Some(response);
    *self.host_err.borrow_mut() = None;
  }

  /// Records a failed `HostCallHandler` result for the most recent `__host_call`.
  pub fn set_host_error(&self, error: String) {
    *self.host_err.borrow_mut() = Some(error);
    *self.host_resp.borrow_mut() = None;
  }

  /// The most recent host-call response, if any.
  #[must_use]
  pub fn host_response(&self) -> Option<Vec<u8>> {
    self.host_resp.borrow().clone()
  }

  /// The most recent host-call error, if any.
  #[must_use]
  pub fn host_error(&self) -> Option<String> {
    self.host_err.borrow().clone()
  }
}

thread_local! {
  static CURRENT: RefCell<Option<InvokeContext>> = const { RefCell::new(None) };
}

/// Binds `ctx` to the current thread for the duration of `f`, then hands the
/// context back so the caller can inspect its final `guest_resp`/`guest_err`.
///
/// This is a one-shot, never-inherited binding: nesting (an `Invoke`
/// triggering another `Invoke` on the same thread) is a
/// programming error in the guest or host and is rejected rather than
/// silently shadowing the outer call.
pub(crate) fn bind<R>(ctx: InvokeContext, f: impl FnOnce() -> R) -> (R, InvokeContext) {
  CURRENT.with(|slot| {
    let mut slot = slot.borrow_mut();
    assert!(slot.is_none(), "wapc: nested Invoke on the same thread is not supported");
    *slot = Some(ctx);
  });
  let result = f();
  let ctx = CURRENT.with(|slot| match slot.borrow_mut().take() {
    Some(ctx) => ctx,
    None => unreachable!("wapc: invocation context vanished during call"),
  });
  (result, ctx)
}

/// Runs `f` against the ambient invocation context, if one is bound.
///
/// Returns `None` when no `Invoke` is in flight on this thread. ABI functions
/// treat this as inert rather than as an error.
pub fn with_current<R>(f: impl FnOnce(&InvokeContext) -> R) -> Option<R> {
  CURRENT.with(|slot| slot.borrow().as_ref().map(f))
}
