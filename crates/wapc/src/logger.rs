//! The optional text sink consulted by `__console_log`.

/// A destination for guest `__console_log` messages.
///
/// When a [`crate::config::ModuleConfig`] has no `logger` configured,
/// `__console_log` still never fails — it simply has
/// nowhere to deliver the message.
pub trait Logger: Send + Sync {
  /// Delivers one guest console-log message.
  fn log(&self, instance_id: u64, message: &str);
}

impl<F> Logger for F
where
  F: Fn(u64, &str) + Send + Sync,
{
  fn log(&self, instance_id: u64, message: &str) {
    self(instance_id, message)
  }
}

/// A [`Logger`] that forwards to the `log` crate facade at `info` level.
#[derive(Debug, Default, Clone, Copy)]
#[must_use]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
  fn log(&self, instance_id: u64, message: &str) {
    log::info!("guest module {instance_id}: {message}");
  }
}
