//! This crate's error type, and its conversion into `wapc::errors::Error`.

/// A convenience wrapper of `Result` that relies on
/// [`wasm3_engine::errors::Error`](crate::errors::Error) to hold errors.
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// This crate's Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Error returned from the `wasm3` rust wrapper.
  #[error("WASM3: {0}")]
  Wasm3(String),
  /// A guest start function (`_start`/`wapc_init`) trapped or returned an error.
  #[error("initialization of `{0}` failed: {1}")]
  StartFailed(&'static str, String),
  /// Error caused when a host function cannot be registered against a loaded module.
  #[error("cannot link function '{func}': {err}")]
  LinkerFuncDef {
    /// The wasm function that was being defined.
    func: String,
    /// The error reported by wasm3.
    err: String,
  },
}

impl From<wasm3::error::Error> for Error {
  fn from(e: wasm3::error::Error) -> Self {
    Error::Wasm3(e.to_string())
  }
}

impl From<Error> for wapc::errors::Error {
  fn from(e: Error) -> Self {
    wapc::errors::Error::ProviderFailure(Box::new(e))
  }
}

// `wasm3`'s error type isn't Send or Sync since it contains a raw pointer.
// This trait normalizes `Result`s coming from wasm3 into ones that are
// easier to propagate through this crate's own `Error`.
pub(crate) trait SendSyncResult<T> {
  fn to_wapc(self) -> Result<T>;
}

impl<T> SendSyncResult<T> for std::result::Result<T, wasm3::error::Error> {
  fn to_wapc(self) -> Result<T> {
    self.map_err(Into::into)
  }
}
