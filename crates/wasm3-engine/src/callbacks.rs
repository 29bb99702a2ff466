//! Registration of the `wapc` host-import module against a loaded `wasm3`
//! module.
//!
//! As in `wasmtime-engine::callbacks`, the decode/dispatch logic for each of
//! the nine functions lives once in `wapc::abi`; this module's only job is
//! to pull the calling instance's linear memory out of a `wasm3::CallContext`
//! and hand it to that shared logic through the small [`CallContextMemory`]
//! adapter below. A guest is free to import only the subset of the nine it
//! actually uses, so an unresolved optional import is logged and skipped
//! rather than treated as fatal; `__guest_request`,
//! `__guest_response` and `__guest_error` are the three a waPC guest cannot
//! function without, so those three are hard failures.
use std::sync::Arc;

use wapc::abi::{self, HostMemory};
use wapc::wapc_functions::{self, HOST_NAMESPACE};
use wapc::{HostCallHandler, Logger};
use wasm3::error::Trap;
use wasm3::CallContext;

use crate::errors::{Error, Result};

/// Adapts a `wasm3::CallContext`'s linear memory into [`HostMemory`].
///
/// `memory_mut` is `unsafe` in the `wasm3` crate because it hands back a
/// mutable view into memory the C runtime also holds a pointer to; that is
/// sound here because, as everywhere else in this core, a single instance is
/// never invoked by two callers concurrently.
struct CallContextMemory<'cc> {
  ctx: &'cc CallContext<'cc>,
}

impl HostMemory for CallContextMemory<'_> {
  fn read(&self, field_name: &str, offset: u32, len: u32) -> Vec<u8> {
    wapc::read(self.ctx.memory(), field_name, offset, len)
  }

  fn write(&mut self, offset: u32, bytes: &[u8]) {
    let memory = unsafe { self.ctx.memory_mut() };
    let start = offset as usize;
    memory
      .get_mut(start..start + bytes.len())
      .unwrap_or_else(|| panic!("wapc: guest memory write out of bounds at {offset}"))
      .copy_from_slice(bytes);
  }
}

pub(crate) fn link_all(
  module: &mut wasm3::Module<'_>,
  host: Arc<dyn HostCallHandler>,
  logger: Option<Arc<dyn Logger>>,
  instance_id: u64,
) -> Result<()> {
  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::GUEST_REQUEST_FN, move |ctx: CallContext, (op_ptr, ptr): (i32, i32)| {
      let mut mem = CallContextMemory { ctx: &ctx };
      abi::guest_request(&mut mem, op_ptr as u32, ptr as u32);
      Ok(())
    })
    .is_err()
  {
    return Err(Error::LinkerFuncDef {
      func: format!("{HOST_NAMESPACE}.{}", wapc_functions::GUEST_REQUEST_FN),
      err: "guest module does not import __guest_request; it cannot participate in waPC".to_owned(),
    });
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::GUEST_RESPONSE_FN, move |ctx: CallContext, (ptr, len): (i32, i32)| {
      let mem = CallContextMemory { ctx: &ctx };
      abi::guest_response(&mem, ptr as u32, len as u32);
      Ok(())
    })
    .is_err()
  {
    return Err(Error::LinkerFuncDef {
      func: format!("{HOST_NAMESPACE}.{}", wapc_functions::GUEST_RESPONSE_FN),
      err: "guest module does not import __guest_response; it cannot participate in waPC".to_owned(),
    });
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::GUEST_ERROR_FN, move |ctx: CallContext, (ptr, len): (i32, i32)| {
      let mem = CallContextMemory { ctx: &ctx };
      abi::guest_error(&mem, ptr as u32, len as u32);
      Ok(())
    })
    .is_err()
  {
    return Err(Error::LinkerFuncDef {
      func: format!("{HOST_NAMESPACE}.{}", wapc_functions::GUEST_ERROR_FN),
      err: "guest module does not import __guest_error; it cannot participate in waPC".to_owned(),
    });
  }

  let log = logger.clone();
  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::HOST_CONSOLE_LOG, move |ctx: CallContext, (ptr, len): (i32, i32)| {
      let mem = CallContextMemory { ctx: &ctx };
      abi::console_log(&mem, log.as_deref(), instance_id, ptr as u32, len as u32);
      Ok(())
    })
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __console_log");
  }

  let h = host.clone();
  if module
    .link_closure(
      HOST_NAMESPACE,
      wapc_functions::HOST_CALL,
      move |ctx: CallContext,
            (bd_ptr, bd_len, ns_ptr, ns_len, op_ptr, op_len, ptr, len): (i32, i32, i32, i32, i32, i32, i32, i32)|
            -> std::result::Result<i32, Trap> {
        let mut mem = CallContextMemory { ctx: &ctx };
        Ok(abi::host_call(
          &mut mem,
          Some(h.as_ref()),
          instance_id,
          bd_ptr as u32,
          bd_len as u32,
          ns_ptr as u32,
          ns_len as u32,
          op_ptr as u32,
          op_len as u32,
          ptr as u32,
          len as u32,
        ) as i32)
      },
    )
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __host_call; outbound calls are unavailable");
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::HOST_RESPONSE_FN, move |ctx: CallContext, ptr: i32| {
      let mut mem = CallContextMemory { ctx: &ctx };
      abi::host_response(&mut mem, ptr as u32);
      Ok(())
    })
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __host_response");
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::HOST_RESPONSE_LEN_FN, move |_ctx: CallContext, ()| -> std::result::Result<i32, Trap> {
      Ok(abi::host_response_len() as i32)
    })
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __host_response_len");
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::HOST_ERROR_FN, move |ctx: CallContext, ptr: i32| {
      let mut mem = CallContextMemory { ctx: &ctx };
      abi::host_error(&mut mem, ptr as u32);
      Ok(())
    })
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __host_error");
  }

  if module
    .link_closure(HOST_NAMESPACE, wapc_functions::HOST_ERROR_LEN_FN, move |_ctx: CallContext, ()| -> std::result::Result<i32, Trap> {
      Ok(abi::host_error_len() as i32)
    })
    .is_err()
  {
    log::warn!("guest module {instance_id} did not import __host_error_len");
  }

  // Guests sometimes probe for a WASI `fd_write` before falling back to
  // waPC's own `__console_log`; suppress it rather than leaving the import
  // unresolved.
  let _ = module.link_closure(
    "wasi_unstable",
    "fd_write",
    move |_ctx: CallContext, (_, _, _, _): (i32, i32, i32, i32)| -> std::result::Result<i32, Trap> { Ok(0) },
  );

  Ok(())
}
