use std::io::Write;
use std::sync::Arc;

use crate::logger::Logger;

/// A byte sink an engine can wire up as a guest's stdout/stderr.
///
/// Bounded `Send + Sync` (not just `Send`) so that `ModuleConfig`, and in
/// turn `Module`, stay `Sync`: a `Module` is routinely shared behind an
/// `Arc` and `instantiate`d from multiple threads at once.
pub type IoSink = Box<dyn Write + Send + Sync>;

/// Options recognized when creating a [`crate::Module`].
///
/// Unknown options passed through an engine's own native configuration
/// (e.g. a raw `wasmtime::Config`) are ignored by this crate; only the
/// fields below are part of the portable contract.
#[must_use]
pub struct ModuleConfig {
  /// Where the guest's stdout is wired, if anywhere. Consulted by the
  /// engine's own I/O plumbing (e.g. a WASI context), not by this crate.
  pub stdout: Option<IoSink>,
  /// Where the guest's stderr is wired, if anywhere.
  pub stderr: Option<IoSink>,
  /// The sink `__console_log` messages are delivered to, if any.
  pub logger: Option<Arc<dyn Logger>>,
  /// WASI argv/env/directory wiring, for engines that support it.
  pub wasi: WasiParams,
}

impl Default for ModuleConfig {
  fn default() -> Self {
    ModuleConfig {
      stdout: None,
      stderr: None,
      logger: None,
      wasi: WasiParams::default(),
    }
  }
}

impl std::fmt::Debug for ModuleConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ModuleConfig")
      .field("stdout", &self.stdout.as_ref().map(|_| "Some(..)"))
      .field("stderr", &self.stderr.as_ref().map(|_| "Some(..)"))
      .field("logger", &self.logger.as_ref().map(|_| "Some(..)"))
      .field("wasi", &self.wasi)
      .finish()
  }
}

/// Parameters defining the options for enabling WASI on a module, where the
/// engine supports it. WASI wiring is an engine-level concern; the core
/// merely carries configuration for it.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
#[must_use]
pub struct WasiParams {
  /// Command line arguments to expose to WASI.
  pub argv: Vec<String>,
  /// A mapping of guest-visible directory name to host directory path.
  pub map_dirs: Vec<(String, String)>,
  /// Environment variables and values to expose.
  pub env_vars: Vec<(String, String)>,
  /// Host directories WASI may access directly (guest name == host path).
  pub preopened_dirs: Vec<String>,
}
