//! Library-specific error types and utility functions

/// Error type for waPC errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Error returned when the compiled guest module does not export one of the
  /// waPC-protocol functions `Instantiate` requires (`__guest_call`).
  #[error("No such function `{1}` in Wasm module (instance `{0}`)")]
  NoSuchFunction(String, String),
  /// I/O related error.
  #[error("I/O Error: {0}")]
  IO(#[from] std::io::Error),
  /// Miscellaneous error.
  #[error("WebAssembly failure: {0}")]
  WasmMisc(String),
  /// Module or instance compilation/instantiation failed.
  #[error("Initialization failed: {0}")]
  InitFailed(String),
  /// Error during a guest call: either the guest set `__guest_error`, the
  /// engine reported a trap, or the guest returned an unsuccessful status
  /// without a message.
  #[error("Guest call failure: {0}")]
  GuestCallFailure(String),
  /// Error originating from a WASM Engine provider.
  #[error("WASM Provider failure: {0}")]
  ProviderFailure(Box<dyn std::error::Error + Sync + Send>),
  /// Operation attempted on a `Module` or `Instance` after `Close` was called.
  #[error("{0} is closed")]
  Closed(&'static str),
  /// General errors.
  #[error("General: {0}")]
  General(String),
}

#[cfg(test)]
mod tests {
  #[allow(dead_code)]
  fn needs_sync_send<T: Send + Sync>() {}

  #[test]
  fn assert_sync_send() {
    needs_sync_send::<super::Error>();
  }
}
