//! The `wasm3`-backed [`wapc::Engine`] implementation.
//!
//! Unlike `wasmtime`, `wasm3` has no "compile once, instantiate many"
//! primitive of its own: an `Environment` owns the `Runtime`s created from
//! it, and a `Runtime` owns the `Module`s loaded into it, all tied together
//! by borrow lifetimes. So where [`crate::Wasm3Artifact`] differs from its
//! `wasmtime-engine` counterpart is that it keeps the raw guest bytes around
//! and re-parses/re-links them into a brand-new `Environment` + `Runtime`
//! for every [`wapc::EngineArtifact::instantiate`] call.
use std::sync::Arc;

use wapc::{wapc_functions, Engine as WapcEngine, EngineArtifact, EngineInstance, HostCallHandler, Module, ModuleConfig};
use wasm3::{Environment, Runtime};

use crate::callbacks;
use crate::errors::{Error, Result, SendSyncResult};

/// Bytes of stack wasm3 gives each runtime it creates.
const RUNTIME_STACK_BYTES: u32 = 1024 * 120;

/// A `wasm3`-backed [`wapc::Engine`].
///
/// `wasm3` is an interpreter rather than a JIT: plugging it in behind the
/// same [`wapc::Engine`] façade as `wasmtime-engine` demonstrates that the
/// core's protocol state machine assumes nothing about how the guest's code
/// actually executes.
#[derive(Debug, Default, Clone, Copy)]
#[must_use]
pub struct Wasm3Engine;

impl Wasm3Engine {
  /// Builds a `Wasm3Engine`. There is no native handle to customize: wasm3's
  /// `Environment`/`Runtime` pair is cheap enough to build fresh per
  /// instance (see the module doc comment), so there is nothing to share
  /// up front the way `wasmtime::Engine` is shared.
  pub fn new() -> Self {
    Wasm3Engine
  }
}

impl WapcEngine for Wasm3Engine {
  fn name(&self) -> &'static str {
    "wasm3"
  }

  fn compile(
    &self,
    host: Arc<dyn HostCallHandler>,
    guest_bytes: &[u8],
    config: ModuleConfig,
  ) -> std::result::Result<Module, wapc::errors::Error> {
    // wasm3 has no separate validate/compile step short of actually parsing
    // against a live `Environment`; do a throwaway parse here purely so a
    // malformed module is rejected at `compile` time rather than silently
    // deferred to the first `instantiate`.
    let env = Environment::new().map_err(Error::from)?;
    wasm3::Module::parse(&env, guest_bytes).to_wapc()?;

    let artifact = Wasm3Artifact {
      guest_bytes: guest_bytes.to_vec(),
      host,
    };
    Ok(Module::from_artifact(Box::new(artifact), config))
  }
}

pub(crate) struct Wasm3Artifact {
  guest_bytes: Vec<u8>,
  host: Arc<dyn HostCallHandler>,
}

impl EngineArtifact for Wasm3Artifact {
  fn instantiate(&self, name: &str, config: &ModuleConfig) -> std::result::Result<Box<dyn EngineInstance>, wapc::errors::Error> {
    let instance_id: u64 = name.parse().unwrap_or(0);

    let env = Environment::new().map_err(Error::from)?;
    let rt = env.create_runtime(RUNTIME_STACK_BYTES).map_err(Error::from)?;
    let parsed = wasm3::Module::parse(&env, self.guest_bytes.as_slice()).map_err(Error::from)?;
    let mut module = rt.load_module(parsed).map_err(Error::from)?;

    // Best-effort: not every guest needs WASI, and `wasm3`'s own shim covers
    // only a subset of `wasi_snapshot_preview1`.
    let _ = module.link_wasi();

    callbacks::link_all(&mut module, self.host.clone(), config.logger.clone(), instance_id)?;

    if module.find_function::<(i32, i32), i32>(wapc_functions::GUEST_CALL).is_err() {
      return Err(wapc::errors::Error::NoSuchFunction(name.to_owned(), wapc_functions::GUEST_CALL.to_owned()));
    }

    let instance = Wasm3Instance { rt, name: name.to_owned() };
    instance.run_starts()?;
    Ok(Box::new(instance))
  }
}

pub(crate) struct Wasm3Instance {
  rt: Runtime,
  name: String,
}

// `wasm3::Runtime` wraps a raw pointer into the underlying C interpreter and
// so is not `Send`/`Sync` by default. A `Wasm3Instance` is only ever reached
// through `wapc::Instance`, which serializes every access behind its own
// `Mutex` (a single instance must not be invoked concurrently by two
// callers), so moving or sharing the handle between threads one at a time
// is sound.
unsafe impl Send for Wasm3Instance {}
unsafe impl Sync for Wasm3Instance {}

impl Wasm3Instance {
  /// Runs the WASI `_start` and waPC `wapc_init` exports, in that order, if
  /// the guest exports them.
  fn run_starts(&self) -> Result<()> {
    for starter in wapc_functions::REQUIRED_STARTS {
      let Ok(func) = self.rt.find_function::<(), ()>(starter) else {
        continue;
      };
      func.call().map_err(|e| Error::StartFailed(starter, e.to_string()))?;
    }
    Ok(())
  }
}

impl EngineInstance for Wasm3Instance {
  fn guest_call(&mut self, op_len: u32, msg_len: u32) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
    let func = self
      .rt
      .find_function::<(i32, i32), i32>(wapc_functions::GUEST_CALL)
      .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(Error::Wasm3(format!("instance `{}`: {e}", self.name))) })?;
    let result = func
      .call(op_len as i32, msg_len as i32)
      .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(Error::from(e)) })?;
    Ok(result as u32)
  }

  fn memory_size(&self) -> u32 {
    self.rt.memory().len() as u32
  }
}
