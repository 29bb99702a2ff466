//! Integration tests for the waPC protocol state machine, driven through the
//! `wasmtime-engine` backend with hand-written WAT guest fixtures (no
//! prebuilt `.wasm` fixture file, since no compiled guest binaries ship in
//! this workspace).
use std::sync::{Arc, Mutex};

use wapc::errors::Error;
use wapc::{Engine, HostCallResult, ModuleConfig};
use wasmtime_engine::WasmtimeEngine;

fn null_host() -> Arc<dyn wapc::HostCallHandler> {
  Arc::new(|_id: u64, _binding: &str, _ns: &str, _op: &str, _payload: &[u8]| -> HostCallResult { Ok(Vec::new()) })
}

const ECHO_GUEST: &str = r#"
(module
  (import "wapc" "__guest_request" (func $guest_request (param i32 i32)))
  (import "wapc" "__guest_response" (func $guest_response (param i32 i32)))
  (memory (export "memory") 2)
  (func (export "__guest_call") (param $op_len i32) (param $msg_len i32) (result i32)
    (call $guest_request (i32.const 0) (i32.const 1024))
    (call $guest_response (i32.const 1024) (local.get $msg_len))
    (i32.const 1)
  )
)
"#;

const GUEST_ERROR_GUEST: &str = r#"
(module
  (import "wapc" "__guest_error" (func $guest_error (param i32 i32)))
  (memory (export "memory") 2)
  (data (i32.const 0) "bad input")
  (func (export "__guest_call") (param i32 i32) (result i32)
    (call $guest_error (i32.const 0) (i32.const 9))
    (i32.const 0)
  )
)
"#;

const UNSUCCESSFUL_GUEST: &str = r#"
(module
  (memory (export "memory") 2)
  (func (export "__guest_call") (param i32 i32) (result i32)
    (i32.const 0)
  )
)
"#;

const NO_GUEST_CALL_GUEST: &str = r#"
(module
  (memory (export "memory") 2)
  (func (export "not_guest_call") (result i32) (i32.const 0))
)
"#;

const HOST_CALL_SUCCESS_GUEST: &str = r#"
(module
  (import "wapc" "__host_call"
    (func $host_call (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)))
  (import "wapc" "__host_response_len" (func $host_response_len (result i32)))
  (import "wapc" "__host_response" (func $host_response (param i32)))
  (import "wapc" "__guest_response" (func $guest_response (param i32 i32)))
  (memory (export "memory") 2)
  (data (i32.const 0) "binding")
  (data (i32.const 16) "namespace")
  (data (i32.const 32) "operation")
  (data (i32.const 48) "payload")
  (func (export "__guest_call") (param i32 i32) (result i32)
    (local $ok i32)
    (local $len i32)
    (local.set $ok (call $host_call
      (i32.const 0) (i32.const 7)
      (i32.const 16) (i32.const 9)
      (i32.const 32) (i32.const 9)
      (i32.const 48) (i32.const 7)))
    (local.set $len (call $host_response_len))
    (call $host_response (i32.const 1024))
    (call $guest_response (i32.const 1024) (local.get $len))
    (local.get $ok)
  )
)
"#;

const HOST_CALL_FAILURE_GUEST: &str = r#"
(module
  (import "wapc" "__host_call"
    (func $host_call (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)))
  (import "wapc" "__host_error_len" (func $host_error_len (result i32)))
  (import "wapc" "__host_error" (func $host_error (param i32)))
  (import "wapc" "__guest_error" (func $guest_error (param i32 i32)))
  (memory (export "memory") 2)
  (data (i32.const 0) "binding")
  (data (i32.const 16) "namespace")
  (data (i32.const 32) "operation")
  (data (i32.const 48) "payload")
  (func (export "__guest_call") (param i32 i32) (result i32)
    (local $len i32)
    (drop (call $host_call
      (i32.const 0) (i32.const 7)
      (i32.const 16) (i32.const 9)
      (i32.const 32) (i32.const 9)
      (i32.const 48) (i32.const 7)))
    (local.set $len (call $host_error_len))
    (call $host_error (i32.const 1024))
    (call $guest_error (i32.const 1024) (local.get $len))
    (i32.const 0)
  )
)
"#;

const TWO_HOST_CALLS_GUEST: &str = r#"
(module
  (import "wapc" "__host_call"
    (func $host_call (param i32 i32 i32 i32 i32 i32 i32 i32) (result i32)))
  (memory (export "memory") 2)
  (data (i32.const 0) "b")
  (data (i32.const 16) "n")
  (data (i32.const 32) "first")
  (data (i32.const 48) "second")
  (func (export "__guest_call") (param i32 i32) (result i32)
    (drop (call $host_call
      (i32.const 0) (i32.const 1)
      (i32.const 16) (i32.const 1)
      (i32.const 32) (i32.const 5)
      (i32.const 32) (i32.const 5)))
    (drop (call $host_call
      (i32.const 0) (i32.const 1)
      (i32.const 16) (i32.const 1)
      (i32.const 48) (i32.const 6)
      (i32.const 48) (i32.const 6)))
    (i32.const 1)
  )
)
"#;

/// S1: a guest that echoes its request payload back verbatim.
#[test]
fn echo_round_trips_payload() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), ECHO_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let response = instance.invoke("echo", &[0x01, 0x02, 0x03])?;
  assert_eq!(response, vec![0x01, 0x02, 0x03]);

  instance.close();
  module.close();
  Ok(())
}

/// S1 variant: an empty payload round-trips to an empty response, not an error.
#[test]
fn echo_round_trips_empty_payload() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), ECHO_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let response = instance.invoke("echo", &[])?;
  assert!(response.is_empty());
  Ok(())
}

/// S3: `__guest_error` is surfaced verbatim as the `Invoke` error.
#[test]
fn guest_error_is_surfaced_verbatim() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), GUEST_ERROR_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let err = instance.invoke("x", &[]).unwrap_err();
  assert_eq!(err.to_string(), "Guest call failure: bad input");
  Ok(())
}

/// S6: returning 0 without setting a response or an error yields a
/// synthetic "unsuccessful" message naming the operation.
#[test]
fn unsuccessful_without_message_names_the_operation() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), UNSUCCESSFUL_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let err = instance.invoke("q", &[]).unwrap_err();
  let message = err.to_string();
  assert!(message.contains('q'), "{message}");
  assert!(message.contains("unsuccessful"), "{message}");
  Ok(())
}

/// S2: a guest missing `__guest_call` fails `Instantiate`, naming both the
/// assigned instance name and the missing export.
#[test]
fn missing_guest_call_export_fails_instantiate() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), NO_GUEST_CALL_GUEST.as_bytes(), ModuleConfig::default())?;

  let err = module.instantiate().unwrap_err();
  let message = err.to_string();
  assert!(message.contains('1'), "{message}");
  assert!(message.contains("__guest_call"), "{message}");
  Ok(())
}

/// S4: a successful `HostCallHandler` response flows back through
/// `__host_response`/`__host_response_len` into the guest's final response.
#[test]
fn host_call_success_flows_through() -> Result<(), Error> {
  let host = Arc::new(|_id: u64, binding: &str, ns: &str, op: &str, payload: &[u8]| -> HostCallResult {
    assert_eq!(binding, "binding");
    assert_eq!(ns, "namespace");
    assert_eq!(op, "operation");
    assert_eq!(payload, b"payload");
    Ok(b"OK".to_vec())
  });
  let engine = WasmtimeEngine::new();
  let module = engine.compile(host, HOST_CALL_SUCCESS_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let response = instance.invoke("op", &[])?;
  assert_eq!(response, b"OK");
  Ok(())
}

/// S5: a failing `HostCallHandler` is visible to the guest only via the
/// 0-return plus `__host_error*`, never directly to the outer caller; the
/// guest here relays it back out as its own `guestErr`.
#[test]
fn host_call_failure_is_visible_to_guest_only() -> Result<(), Error> {
  let host = Arc::new(|_id: u64, _b: &str, _n: &str, _o: &str, _p: &[u8]| -> HostCallResult { Err("nope".into()) });
  let engine = WasmtimeEngine::new();
  let module = engine.compile(host, HOST_CALL_FAILURE_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  let err = instance.invoke("op", &[]).unwrap_err();
  assert_eq!(err.to_string(), "Guest call failure: nope");
  Ok(())
}

/// Property 3: the `HostCallHandler` observes `__host_call` sites in the
/// guest's own program order.
#[test]
fn host_calls_are_observed_in_program_order() -> Result<(), Error> {
  let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
  let seen_clone = seen.clone();
  let host = Arc::new(move |_id: u64, _b: &str, _n: &str, op: &str, _p: &[u8]| -> HostCallResult {
    seen_clone.lock().unwrap().push(op.to_owned());
    Ok(Vec::new())
  });
  let engine = WasmtimeEngine::new();
  let module = engine.compile(host, TWO_HOST_CALLS_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  instance.invoke("op", &[])?;
  assert_eq!(*seen.lock().unwrap(), vec!["first".to_owned(), "second".to_owned()]);
  Ok(())
}

/// Property 7: successive `Instantiate` calls yield consecutive 1-based
/// decimal instance names.
#[test]
fn instance_names_are_consecutive_decimal_ordinals() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), ECHO_GUEST.as_bytes(), ModuleConfig::default())?;

  let first = module.instantiate()?;
  let second = module.instantiate()?;
  let third = module.instantiate()?;

  assert_eq!(first.name(), "1");
  assert_eq!(second.name(), "2");
  assert_eq!(third.name(), "3");
  Ok(())
}

/// Property 5 & 6: `Close` is idempotent, and further use after `Close`
/// fails (but does not panic).
#[test]
fn close_is_idempotent_and_rejects_further_use() -> Result<(), Error> {
  let engine = WasmtimeEngine::new();
  let module = engine.compile(null_host(), ECHO_GUEST.as_bytes(), ModuleConfig::default())?;
  let instance = module.instantiate()?;

  instance.close();
  instance.close();
  assert!(instance.invoke("echo", &[]).is_err());

  module.close();
  module.close();
  assert!(module.instantiate().is_err());
  Ok(())
}
