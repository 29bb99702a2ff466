//! WASI `preview1` context construction, built on the `wasmtime-wasi` crate's
//! `preview1` compatibility shim. Standard I/O is always inherited from the
//! host process; `ModuleConfig::stdout`/`stderr` are accepted as part of the
//! portable configuration surface but this engine does not yet redirect
//! WASI's stdio streams to them; see `DESIGN.md`.
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use wasmtime_wasi::preview1::WasiP1Ctx;
use wasmtime_wasi::{DirPerms, FilePerms, WasiCtxBuilder};

use wapc::WasiParams;

use crate::errors::{Error, Result};

pub(crate) fn build_ctx(params: &WasiParams) -> Result<WasiP1Ctx> {
  let mut builder = WasiCtxBuilder::new();
  builder.inherit_stdio();
  builder.args(&params.argv);
  for (key, value) in &params.env_vars {
    builder.env(key, value);
  }

  let authority = ambient_authority();
  for dir in &params.preopened_dirs {
    let handle =
      Dir::open_ambient_dir(dir, authority).map_err(|e| Error::WasiInitCtxError(format!("{dir}: {e}")))?;
    builder.preopened_dir(handle, dir, DirPerms::all(), FilePerms::all());
  }
  for (guest, host) in &params.map_dirs {
    let handle =
      Dir::open_ambient_dir(host, authority).map_err(|e| Error::WasiInitCtxError(format!("{host}: {e}")))?;
    builder.preopened_dir(handle, guest, DirPerms::all(), FilePerms::all());
  }

  Ok(builder.build_p1())
}
