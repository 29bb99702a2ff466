/// The operation name and payload a caller passes to [`crate::Instance::invoke`].
///
/// Both fields are opaque as far as the core is concerned: `operation` is
/// required to be UTF-8 (it is written into guest memory as text) but its
/// contents carry no meaning to this crate, and `payload` is an arbitrary
/// byte buffer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[must_use]
pub struct Invocation {
  /// The operation the guest should perform.
  pub operation: String,
  /// The request payload handed to the guest.
  pub msg: Vec<u8>,
}

impl Invocation {
  /// Creates a new invocation.
  pub fn new(operation: impl Into<String>, msg: Vec<u8>) -> Self {
    Invocation {
      operation: operation.into(),
      msg,
    }
  }
}
