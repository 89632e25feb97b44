use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::{Scheduler, SchedulerConfig};
use crate::error::SchedulerError;

/// Owns the runtime backing an IO pool and stops it without waiting for
/// blocking tasks still in flight.
#[derive(Debug)]
struct IoRuntime(Option<Runtime>);

impl Drop for IoRuntime {
  fn drop(&mut self) {
    if let Some(runtime) = self.0.take() {
      runtime.shutdown_background();
    }
  }
}

/// A cached pool for blocking work.
///
/// Workers are spawned on demand up to `max_threads`, reused while busy
/// streams keep submitting, and retired after `keep_alive` of idleness.
#[derive(Clone, Debug)]
pub struct IoScheduler {
  runtime: Arc<IoRuntime>,
}

impl IoScheduler {
  pub fn with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
    config.validate()?;
    let prefix = config.thread_name_prefix.clone();
    let thread_id = AtomicUsize::new(0);
    let runtime = Builder::new_multi_thread()
      .worker_threads(1)
      .max_blocking_threads(config.max_threads)
      .thread_keep_alive(config.keep_alive)
      .thread_name_fn(move || format!("{prefix}{}", thread_id.fetch_add(1, Ordering::Relaxed)))
      .build()?;
    debug!(
      max_threads = config.max_threads,
      keep_alive = ?config.keep_alive,
      prefix = %config.thread_name_prefix,
      "io pool created"
    );
    Ok(IoScheduler { runtime: Arc::new(IoRuntime(Some(runtime))) })
  }
}

impl Scheduler for IoScheduler {
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    if let Some(runtime) = &self.runtime.0 {
      runtime.handle().spawn_blocking(task);
    }
  }
}
