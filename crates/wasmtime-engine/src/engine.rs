//! The `wasmtime`-backed [`wapc::Engine`] implementation: compiles guest
//! bytes once into a [`WasmtimeArtifact`], which in turn spawns
//! [`WasmtimeInstance`]s.
use std::sync::Arc;

use wapc::{wapc_functions, Engine as WapcEngine, EngineArtifact, EngineInstance, HostCallHandler, Module, ModuleConfig};
use wasmtime::{Config, Linker, Store, TypedFunc};

use crate::errors::{Error, Result};
use crate::store::WapcStore;

/// Deadlines, expressed in `wasmtime` epoch ticks, applied to guest code.
///
/// The waPC core has no cancellation channel of its own; epoch-based
/// interruption is `wasmtime`'s substitute for it.
#[derive(Clone, Copy, Debug)]
pub struct EpochDeadlines {
  /// Deadline for the `_start`/`wapc_init` initialization code.
  pub init: u64,
  /// Deadline for a single `__guest_call` invocation.
  pub invoke: u64,
}

/// A `wasmtime`-backed [`wapc::Engine`].
#[allow(missing_debug_implementations)]
pub struct WasmtimeEngine {
  engine: wasmtime::Engine,
  epoch_deadlines: Option<EpochDeadlines>,
}

impl Default for WasmtimeEngine {
  fn default() -> Self {
    Self::new()
  }
}

impl WasmtimeEngine {
  /// Builds a `WasmtimeEngine` with default `wasmtime::Config` and no epoch
  /// interruption.
  #[must_use]
  pub fn new() -> Self {
    WasmtimeEngine {
      engine: wasmtime::Engine::default(),
      epoch_deadlines: None,
    }
  }

  /// Builds a `WasmtimeEngine` around a caller-supplied, already configured
  /// `wasmtime::Engine`. Use this to enable the `cache` feature's Cranelift
  /// cache or epoch-based interruption.
  #[must_use]
  pub fn with_runtime(engine: wasmtime::Engine, epoch_deadlines: Option<EpochDeadlines>) -> Self {
    WasmtimeEngine { engine, epoch_deadlines }
  }

  /// Builds a `WasmtimeEngine` with epoch-based interruption enabled and the
  /// given deadlines.
  pub fn with_epoch_deadlines(epoch_deadlines: EpochDeadlines) -> Result<Self> {
    let mut config = Config::default();
    config.epoch_interruption(true);
    let engine = wasmtime::Engine::new(&config)?;
    Ok(WasmtimeEngine {
      engine,
      epoch_deadlines: Some(epoch_deadlines),
    })
  }
}

impl WapcEngine for WasmtimeEngine {
  fn name(&self) -> &'static str {
    "wasmtime"
  }

  fn compile(
    &self,
    host: Arc<dyn HostCallHandler>,
    guest_bytes: &[u8],
    config: ModuleConfig,
  ) -> std::result::Result<Module, wapc::errors::Error> {
    let module = wasmtime::Module::new(&self.engine, guest_bytes).map_err(Error::from)?;

    let mut linker: Linker<WapcStore> = Linker::new(&self.engine);
    #[cfg(feature = "wasi")]
    wasmtime_wasi::preview1::add_to_linker_sync(&mut linker, |s: &mut WapcStore| &mut s.wasi_ctx).map_err(Error::from)?;
    crate::callbacks::add_to_linker(&mut linker)?;

    let instance_pre = linker.instantiate_pre(&module).map_err(Error::from)?;

    let artifact = WasmtimeArtifact {
      engine: self.engine.clone(),
      instance_pre,
      host,
      epoch_deadlines: self.epoch_deadlines,
    };
    Ok(Module::from_artifact(Box::new(artifact), config))
  }
}

pub(crate) struct WasmtimeArtifact {
  engine: wasmtime::Engine,
  instance_pre: wasmtime::InstancePre<WapcStore>,
  host: Arc<dyn HostCallHandler>,
  epoch_deadlines: Option<EpochDeadlines>,
}

impl EngineArtifact for WasmtimeArtifact {
  fn instantiate(&self, name: &str, config: &ModuleConfig) -> std::result::Result<Box<dyn EngineInstance>, wapc::errors::Error> {
    #[cfg(feature = "wasi")]
    let wasi_ctx = crate::wasi::build_ctx(&config.wasi).map_err(Error::from)?;

    let instance_id: u64 = name.parse().unwrap_or(0);
    let store_data = WapcStore {
      host: self.host.clone(),
      logger: config.logger.clone(),
      instance_id,
      #[cfg(feature = "wasi")]
      wasi_ctx,
    };
    let mut store = Store::new(&self.engine, store_data);
    if let Some(deadlines) = self.epoch_deadlines {
      store.set_epoch_deadline(deadlines.init);
    }

    let instance = self
      .instance_pre
      .instantiate(&mut store)
      .map_err(|e| wapc::errors::Error::from(Error::from(e)))?;

    let memory = instance
      .get_memory(&mut store, "memory")
      .ok_or_else(|| wapc::errors::Error::from(Error::Generic(anyhow::anyhow!("guest module does not export linear memory"))))?;

    let guest_call: TypedFunc<(i32, i32), i32> = instance
      .get_typed_func(&mut store, wapc_functions::GUEST_CALL)
      .map_err(|_| wapc::errors::Error::NoSuchFunction(name.to_owned(), wapc_functions::GUEST_CALL.to_owned()))?;

    let mut wasmtime_instance = WasmtimeInstance {
      store,
      instance,
      guest_call,
      memory,
      epoch_deadlines: self.epoch_deadlines,
    };
    wasmtime_instance.run_starts(name).map_err(wapc::errors::Error::from)?;
    log::info!("instantiated wasm module (instance `{name}`)");
    Ok(Box::new(wasmtime_instance))
  }
}

pub(crate) struct WasmtimeInstance {
  store: Store<WapcStore>,
  instance: wasmtime::Instance,
  guest_call: TypedFunc<(i32, i32), i32>,
  memory: wasmtime::Memory,
  epoch_deadlines: Option<EpochDeadlines>,
}

impl WasmtimeInstance {
  /// Runs the WASI `_start` and waPC `wapc_init` exports, in that order, if
  /// the guest exports them.
  fn run_starts(&mut self, name: &str) -> Result<()> {
    for starter in wapc_functions::REQUIRED_STARTS {
      if self.instance.get_export(&mut self.store, starter).is_none() {
        continue;
      }
      if let Some(deadlines) = self.epoch_deadlines {
        self.store.set_epoch_deadline(deadlines.init);
      }
      let func: TypedFunc<(), ()> = self
        .instance
        .get_typed_func(&mut self.store, starter)
        .map_err(|e| Error::StartFailed(starter, e.to_string()))?;
      if let Err(e) = func.call(&mut self.store, ()) {
        tracing::trace!(function = starter, instance = name, error = %e, "guest start function failed");
        return Err(Error::StartFailed(starter, e.to_string()));
      }
    }
    Ok(())
  }
}

impl EngineInstance for WasmtimeInstance {
  fn guest_call(&mut self, op_len: u32, msg_len: u32) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(deadlines) = self.epoch_deadlines {
      self.store.set_epoch_deadline(deadlines.invoke);
    }
    let result = self.guest_call.call(&mut self.store, (op_len as i32, msg_len as i32)).map_err(|e| {
      log::error!("guest call trapped: {e}");
      e
    })?;
    Ok(result as u32)
  }

  fn memory_size(&self) -> u32 {
    self.memory.data_size(&self.store) as u32
  }
}
