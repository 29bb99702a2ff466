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
  unused,
  while_true,
  missing_docs
)]
//! A [`wapc::Engine`] backed by the `wasm3` WebAssembly interpreter.
//!
//! `wasm3` compiles nothing: every guest instruction is interpreted. Next to
//! `wasmtime-engine`'s JIT this exists to prove that the waPC core's
//! protocol state machine assumes nothing about execution strategy.

mod callbacks;
mod engine;

pub mod errors;

pub use engine::Wasm3Engine;
