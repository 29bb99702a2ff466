#![deny(
  clippy::expect_used,
  clippy::explicit_deref_methods,
  clippy::option_if_let_else,
  clippy::cloned_instead_of_copied,
  clippy::explicit_into_iter_loop,
  clippy::flat_map_option,
  clippy::fn_params_excessive_bools,
  clippy::implicit_clone,
  clippy::inefficient_to_string,
  clippy::large_types_passed_by_value,
  clippy::manual_ok_or,
  clippy::map_flatten,
  clippy::map_unwrap_or,
  clippy::must_use_candidate,
  clippy::needless_for_each,
  clippy::needless_pass_by_value,
  clippy::option_option,
  clippy::redundant_else,
  clippy::semicolon_if_nothing_returned,
  clippy::trivially_copy_pass_by_ref,
  clippy::unnested_or_patterns,
  clippy::useless_let_if_seq,
  clippy::str_to_string,
  clippy::inherent_to_string,
  clippy::let_and_return,
  clippy::string_to_string,
  clippy::try_err,
  bad_style,
  clashing_extern_declarations,
  dead_code,
  deprecated,
  improper_ctypes,
  missing_copy_implementations,
  missing_debug_implementations,
  trivial_casts,
  trivial_numeric_casts,
  unreachable_pub,
  unsafe_code,
  unused,
  while_true,
  missing_docs
)]

//! An engine-pluggable WebAssembly host runtime implementing the **waPC**
//! (WebAssembly Procedure Calls) protocol: a binary-framed request/response
//! conversation between a host process and an untrusted guest module.
//!
//! This crate is the authoritative implementation of that protocol. It does
//! not itself compile or execute WebAssembly — that is the job of an
//! [`Engine`] implementation such as a `wasmtime`- or `wasm3`-backed crate.
//! What lives here is:
//!
//! - the host ABI surface (the nine `wapc`-namespaced import functions a
//!   guest calls; see [`abi`]),
//! - the per-call invocation state and its ambient binding (see
//!   [`context`]),
//! - the [`Module`] → [`Instance`] lifecycle, with concurrency-safe close.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wapc::{Engine, ModuleConfig};
//!
//! # fn example(engine: &dyn Engine, guest_bytes: &[u8]) -> Result<(), wapc::errors::Error> {
//! let host = Arc::new(|_id: u64, _binding: &str, _ns: &str, _op: &str, _payload: &[u8]| {
//!   Ok(Vec::new())
//! });
//! let module = engine.compile(host, guest_bytes, ModuleConfig::default())?;
//! let instance = module.instantiate()?;
//! let response = instance.invoke("hello", b"world")?;
//! instance.close();
//! module.close();
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod context;
pub mod errors;
pub mod wapc_functions;

mod config;
mod host;
mod instance;
mod invocation;
mod logger;
mod memory;
mod module;

pub use config::{IoSink, ModuleConfig, WasiParams};
pub use host::{HostCallHandler, HostCallResult};
pub use instance::{EngineInstance, Instance};
pub use invocation::Invocation;
pub use logger::{DefaultLogger, Logger};
pub use memory::{read, read_text};
pub use module::{EngineArtifact, Engine, Module};
pub use wapc_functions::HOST_NAMESPACE;
