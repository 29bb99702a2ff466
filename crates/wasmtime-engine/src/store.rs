//! Per-instance `wasmtime::Store` data.
//!
//! Carries exactly what the registered `wapc` host-import functions need to
//! reach back into the waPC core (`crate::callbacks`): the shared
//! [`HostCallHandler`], the optional [`Logger`], the instance's assigned
//! ordinal (for the `instance_id` parameter those two take), and — when the
//! `wasi` feature is enabled — the guest's WASI context.
use std::sync::Arc;

use wapc::{HostCallHandler, Logger};

#[cfg(feature = "wasi")]
use wasmtime_wasi::preview1::WasiP1Ctx;

pub(crate) struct WapcStore {
  pub(crate) host: Arc<dyn HostCallHandler>,
  pub(crate) logger: Option<Arc<dyn Logger>>,
  pub(crate) instance_id: u64,
  #[cfg(feature = "wasi")]
  pub(crate) wasi_ctx: WasiP1Ctx,
}
