//! Error types carried by streams and raised by schedulers.

use std::sync::Arc;

use thiserror::Error;

/// The cause delivered through `Observer::error`.
///
/// Subjects fan one cause out to every registered observer, so the type is
/// cheap to clone: wrapped foreign errors live behind an `Arc`.
#[derive(Error, Debug, Clone)]
pub enum RxError {
  /// The body of a `create` producer returned a failure.
  #[error("producer failed: {0}")]
  Producer(String),

  /// A `try_map` / `try_filter` callback returned a failure.
  #[error("callback failed: {0}")]
  Callback(String),

  /// A foreign error forwarded as the stream cause.
  #[error(transparent)]
  Source(Arc<dyn std::error::Error + Send + Sync>),

  /// A free-form cause.
  #[error("{0}")]
  Custom(String),
}

impl RxError {
  pub fn producer(message: impl Into<String>) -> Self { RxError::Producer(message.into()) }

  pub fn callback(message: impl Into<String>) -> Self { RxError::Callback(message.into()) }

  pub fn msg(message: impl Into<String>) -> Self { RxError::Custom(message.into()) }

  /// Wraps any error type as a stream cause.
  pub fn from_error<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    RxError::Source(Arc::new(error))
  }
}

impl PartialEq for RxError {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (RxError::Producer(a), RxError::Producer(b)) => a == b,
      (RxError::Callback(a), RxError::Callback(b)) => a == b,
      (RxError::Custom(a), RxError::Custom(b)) => a == b,
      (RxError::Source(a), RxError::Source(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl From<String> for RxError {
  fn from(message: String) -> Self { RxError::Custom(message) }
}

impl From<&str> for RxError {
  fn from(message: &str) -> Self { RxError::Custom(message.to_owned()) }
}

/// Errors raised while building a scheduler's worker pool.
#[derive(Error, Debug)]
pub enum SchedulerError {
  #[error("failed to spawn worker pool: {0}")]
  Spawn(#[from] std::io::Error),

  #[error("invalid scheduler configuration: {0}")]
  InvalidConfig(String),
}

pub type Result<T, E = RxError> = std::result::Result<T, E>;
