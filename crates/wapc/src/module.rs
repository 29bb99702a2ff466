use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ModuleConfig;
use crate::errors::Error;
use crate::host::HostCallHandler;
use crate::instance::{EngineInstance, Instance};

type Result<T> = std::result::Result<T, Error>;

/// A compiled guest artifact, as produced by one [`Engine`] implementation.
///
/// This is the seam an engine crate plugs into: an `Engine` is a capability
/// bundle ("compile bytes to an artifact", "instantiate an artifact with
/// stdio + name", ...), and this trait is the "instantiate" half of that
/// bundle.
pub trait EngineArtifact: Send + Sync {
  /// Creates a fresh, independently invokable instance from this artifact.
  ///
  /// `name` is the ordinal [`Module::instantiate`] assigned; implementations
  /// should use it both as the engine-level instance name and, if
  /// `__guest_call` turns out to be missing, in the
  /// [`Error::NoSuchFunction`] they return.
  fn instantiate(&self, name: &str, config: &ModuleConfig) -> Result<Box<dyn EngineInstance>>;
}

/// An engine-pluggable WebAssembly execution backend.
///
/// Concrete backends (a `wasmtime`-based crate, a `wasm3`-based crate, ...)
/// implement this trait; the protocol semantics in [`crate::instance`] and
/// [`crate::abi`] are identical no matter which one is plugged in.
pub trait Engine: Send + Sync {
  /// A short, stable identifier for this backend, e.g. `"wasmtime"`.
  fn name(&self) -> &'static str;

  /// Compiles `guest_bytes`, registers the `wapc` host-import module backed
  /// by `host`, and returns a [`Module`] ready to spawn instances from.
  fn compile(&self, host: Arc<dyn HostCallHandler>, guest_bytes: &[u8], config: ModuleConfig) -> Result<Module>;
}

/// An engine-compiled guest artifact: a factory for [`Instance`]s.
///
/// `Module` owns the engine runtime handle exclusively. Closing it tears the
/// runtime down, which transitively invalidates every instance it produced
/// — callers must close instances first or accept their invalidation.
#[must_use]
pub struct Module {
  artifact: Box<dyn EngineArtifact>,
  config: ModuleConfig,
  next_id: AtomicU64,
  closed: AtomicBool,
}

impl std::fmt::Debug for Module {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Module")
      .field("artifact", &"Box<dyn EngineArtifact>")
      .field("config", &self.config)
      .field("next_id", &self.next_id)
      .field("closed", &self.closed)
      .finish()
  }
}

impl Module {
  /// Used by [`Engine`] implementations to hand back a freshly compiled
  /// module. Not part of the portable surface: callers only ever receive a
  /// `Module` out of `Engine::compile`.
  pub fn from_artifact(artifact: Box<dyn EngineArtifact>, config: ModuleConfig) -> Self {
    Module {
      artifact,
      config,
      next_id: AtomicU64::new(1),
      closed: AtomicBool::new(false),
    }
  }

  /// Spawns a new, independently invokable [`Instance`] from this module's
  /// compiled artifact. Instances are named with consecutive decimal
  /// ordinals starting at `"1"`.
  ///
  /// Refuses once [`Module::close`] has been called. A concurrent `close`
  /// racing this call may still cause it to fail even though this check
  /// passed; the core only promises that *after* `close` returns, further
  /// use fails.
  pub fn instantiate(&self) -> Result<Instance> {
    if self.closed.load(Ordering::Acquire) {
      return Err(Error::Closed("Module"));
    }
    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
    let name = id.to_string();
    let handle = self.artifact.instantiate(&name, &self.config)?;
    Ok(Instance::new(id, name, handle))
  }

  /// Tears the whole engine runtime down. Idempotent: a second call is a
  /// no-op.
  pub fn close(&self) {
    self.closed.store(true, Ordering::Release);
  }
}
