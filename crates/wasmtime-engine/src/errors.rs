//! This crate's error type, and its conversion into `wapc::errors::Error`.

/// A convenience wrapper of `Result` that relies on
/// [`wasmtime_engine::errors::Error`](crate::errors::Error) to hold errors.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// This crate's Error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// A guest start function (`_start`/`wapc_init`) trapped or returned an error.
  #[error("initialization of `{0}` failed: {1}")]
  StartFailed(&'static str, String),

  /// Error caused when a host function cannot be registered into a `wasmtime::Linker`.
  #[error("linker cannot register function '{func}': {err}")]
  LinkerFuncDef {
    /// The wasm function that was being defined.
    func: String,
    /// The error reported by wasmtime.
    err: String,
  },

  /// Error originating from building the WASI context.
  #[error("WASI context initialization failed: {0}")]
  WasiInitCtxError(String),

  /// Generic error; wasmtime uses `anyhow::Error` inside of its public API.
  #[error(transparent)]
  Generic(#[from] anyhow::Error),
}

impl From<Error> for wapc::errors::Error {
  fn from(e: Error) -> Self {
    wapc::errors::Error::ProviderFailure(Box::new(e))
  }
}
