//! Registration of the `wapc` host-import module against a `wasmtime::Linker`.
//!
//! The decode/dispatch logic for each of the nine functions lives once in
//! `wapc::abi`; everything here does is pull the caller's linear memory out
//! of a `wasmtime::Caller` and hand it to that shared logic through the
//! small [`CallerMemory`] adapter below.
use wapc::abi::{self, HostMemory};
use wapc::wapc_functions::{self, ASSEMBLYSCRIPT_ABORT, ASSEMBLYSCRIPT_NAMESPACE, HOST_NAMESPACE};
use wasmtime::{Caller, Linker, Memory};

use crate::errors::{Error, Result};
use crate::store::WapcStore;

/// Adapts a `wasmtime::Caller`'s exported `memory` into [`HostMemory`] for
/// the duration of a single ABI callback.
struct CallerMemory<'a, 'b> {
  caller: &'a mut Caller<'b, WapcStore>,
  memory: Memory,
}

impl HostMemory for CallerMemory<'_, '_> {
  fn read(&self, field_name: &str, offset: u32, len: u32) -> Vec<u8> {
    wapc::read(self.memory.data(&*self.caller), field_name, offset, len)
  }

  fn write(&mut self, offset: u32, bytes: &[u8]) {
    self
      .memory
      .write(&mut *self.caller, offset as usize, bytes)
      .unwrap_or_else(|e| panic!("wapc: guest memory write out of bounds at {offset}: {e}"));
  }
}

fn caller_memory<'a, 'b>(caller: &'a mut Caller<'b, WapcStore>) -> Result<CallerMemory<'a, 'b>> {
  let memory = caller
    .get_export("memory")
    .and_then(wasmtime::Extern::into_memory)
    .ok_or_else(|| Error::Generic(anyhow::anyhow!("guest module does not export linear memory")))?;
  Ok(CallerMemory { caller, memory })
}

pub(crate) fn add_to_linker(linker: &mut Linker<WapcStore>) -> Result<()> {
  register(
    linker,
    wapc_functions::GUEST_REQUEST_FN,
    |mut caller: Caller<'_, WapcStore>, op_ptr: i32, ptr: i32| -> anyhow::Result<()> {
      let mut mem = caller_memory(&mut caller)?;
      abi::guest_request(&mut mem, op_ptr as u32, ptr as u32);
      Ok(())
    },
  )?;

  register(
    linker,
    wapc_functions::HOST_CONSOLE_LOG,
    |mut caller: Caller<'_, WapcStore>, ptr: i32, len: i32| -> anyhow::Result<()> {
      let (logger, instance_id) = (caller.data().logger.clone(), caller.data().instance_id);
      let mem = caller_memory(&mut caller)?;
      abi::console_log(&mem, logger.as_deref(), instance_id, ptr as u32, len as u32);
      Ok(())
    },
  )?;

  register(
    linker,
    wapc_functions::HOST_CALL,
    |mut caller,
     bd_ptr: i32,
     bd_len: i32,
     ns_ptr: i32,
     ns_len: i32,
     op_ptr: i32,
     op_len: i32,
     ptr: i32,
     len: i32|
     -> anyhow::Result<i32> {
      let instance_id = caller.data().instance_id;
      let host = caller.data().host.clone();
      let mut mem = caller_memory(&mut caller)?;
      Ok(abi::host_call(
        &mut mem,
        Some(host.as_ref()),
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
  )?;

  register(
    linker,
    wapc_functions::HOST_RESPONSE_FN,
    |mut caller: Caller<'_, WapcStore>, ptr: i32| -> anyhow::Result<()> {
      let mut mem = caller_memory(&mut caller)?;
      abi::host_response(&mut mem, ptr as u32);
      Ok(())
    },
  )?;

  register(linker, wapc_functions::HOST_RESPONSE_LEN_FN, |_caller: Caller<'_, WapcStore>| -> anyhow::Result<i32> {
    Ok(abi::host_response_len() as i32)
  })?;

  register(
    linker,
    wapc_functions::GUEST_RESPONSE_FN,
    |mut caller: Caller<'_, WapcStore>, ptr: i32, len: i32| -> anyhow::Result<()> {
      let mem = caller_memory(&mut caller)?;
      abi::guest_response(&mem, ptr as u32, len as u32);
      Ok(())
    },
  )?;

  register(
    linker,
    wapc_functions::GUEST_ERROR_FN,
    |mut caller: Caller<'_, WapcStore>, ptr: i32, len: i32| -> anyhow::Result<()> {
      let mem = caller_memory(&mut caller)?;
      abi::guest_error(&mem, ptr as u32, len as u32);
      Ok(())
    },
  )?;

  register(
    linker,
    wapc_functions::HOST_ERROR_FN,
    |mut caller: Caller<'_, WapcStore>, ptr: i32| -> anyhow::Result<()> {
      let mut mem = caller_memory(&mut caller)?;
      abi::host_error(&mut mem, ptr as u32);
      Ok(())
    },
  )?;

  register(linker, wapc_functions::HOST_ERROR_LEN_FN, |_caller: Caller<'_, WapcStore>| -> anyhow::Result<i32> {
    Ok(abi::host_error_len() as i32)
  })?;

  // AssemblyScript guests import `env.abort` to report unhandled panics.
  // Other backends never emit it; registering a no-op here keeps behavior
  // uniform across engines.
  linker
    .func_wrap(
      ASSEMBLYSCRIPT_NAMESPACE,
      ASSEMBLYSCRIPT_ABORT,
      |_: Caller<'_, WapcStore>, _msg: i32, _file: i32, _line: i32, _col: i32| {},
    )
    .map_err(|e| Error::LinkerFuncDef {
      func: format!("{ASSEMBLYSCRIPT_NAMESPACE}.{ASSEMBLYSCRIPT_ABORT}"),
      err: e.to_string(),
    })?;

  Ok(())
}

fn register<Params, Args>(
  linker: &mut Linker<WapcStore>,
  name: &str,
  func: impl wasmtime::IntoFunc<WapcStore, Params, Args>,
) -> Result<()> {
  linker.func_wrap(HOST_NAMESPACE, name, func).map_err(|e| Error::LinkerFuncDef {
    func: format!("{HOST_NAMESPACE}.{name}"),
    err: e.to_string(),
  })?;
  Ok(())
}
