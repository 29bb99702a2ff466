//! The host-side counterpart of an outbound `__host_call`.

/// The result type returned by a [`HostCallHandler`].
pub type HostCallResult = Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

/// Invoked by the host ABI surface when a guest performs an outbound host
/// call. Implementations are shared across every [`crate::Instance`] spawned
/// from the same [`crate::Module`] and so must be reentrant-safe
/// if the caller drives a module concurrently.
///
/// `id` identifies the calling instance (its ordinal, as assigned by
/// `Module::instantiate`), letting one handler disambiguate calls coming
/// from different instances of the same module.
pub trait HostCallHandler: Send + Sync {
  /// Handles one outbound `__host_call`.
  fn host_call(&self, id: u64, binding: &str, namespace: &str, operation: &str, payload: &[u8]) -> HostCallResult;
}

impl<F> HostCallHandler for F
where
  F: Fn(u64, &str, &str, &str, &[u8]) -> HostCallResult + Send + Sync,
{
  fn host_call(&self, id: u64, binding: &str, namespace: &str, operation: &str, payload: &[u8]) -> HostCallResult {
    self(id, binding, namespace, operation, payload)
  }
}
