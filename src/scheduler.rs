//! Schedulers decide on which thread a unit of work runs.
//!
//! Every scheduler exposes the same capability, `submit`, and differs only in
//! its worker topology:
//!
//! - [`ComputationScheduler`]: a fixed pool sized to the number of cores.
//! - [`IoScheduler`]: a cached pool that grows on demand and retires idle
//!   workers after a keep-alive.
//! - [`SingleThreadScheduler`]: one dedicated worker running tasks in FIFO
//!   order.
//! - [`ImmediateScheduler`]: runs the task inline on the submitting thread.
//! - [`ManualScheduler`]: queues tasks until the test drives them.
//!
//! [`computation`], [`io`] and [`single`] return process-wide pools that are
//! created on first use; `with_config` builds a dedicated one.

use std::{num::NonZeroUsize, thread, time::Duration};

use futures::{executor::ThreadPool, future};
use once_cell::sync::OnceCell;

use crate::error::SchedulerError;

mod io_scheduler;
mod test_scheduler;
mod thread_pool_scheduler;

pub use io_scheduler::IoScheduler;
pub use test_scheduler::ManualScheduler;
pub use thread_pool_scheduler::{ComputationScheduler, SingleThreadScheduler};

/// A Scheduler is an object to order tasks and run them on its workers.
///
/// Cloning a scheduler shares its workers.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Accepts a task for asynchronous execution. Never blocks on the task.
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static;
}

impl Scheduler for ThreadPool {
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.spawn_ok(future::lazy(move |_| task()));
  }
}

/// Runs every task inline, on the thread calling `submit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  #[inline]
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    task()
  }
}

/// Sizing of a scheduler's worker pool.
///
/// Fields a topology does not use are ignored: `keep_alive` and `max_threads`
/// only apply to the IO pool, `pool_size` only to the computation pool.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
  pub pool_size: usize,
  pub thread_name_prefix: String,
  pub keep_alive: Duration,
  pub max_threads: usize,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    SchedulerConfig {
      pool_size: thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1),
      thread_name_prefix: "rx-worker-".to_owned(),
      keep_alive: Duration::from_secs(60),
      max_threads: 512,
    }
  }
}

impl SchedulerConfig {
  pub fn pool_size(mut self, pool_size: usize) -> Self {
    self.pool_size = pool_size;
    self
  }

  pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.thread_name_prefix = prefix.into();
    self
  }

  pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
    self.keep_alive = keep_alive;
    self
  }

  pub fn max_threads(mut self, max_threads: usize) -> Self {
    self.max_threads = max_threads;
    self
  }

  pub fn validate(&self) -> Result<(), SchedulerError> {
    if self.pool_size == 0 {
      return Err(SchedulerError::InvalidConfig("pool_size must be at least 1".to_owned()));
    }
    if self.max_threads == 0 {
      return Err(SchedulerError::InvalidConfig("max_threads must be at least 1".to_owned()));
    }
    Ok(())
  }
}

static COMPUTATION: OnceCell<ComputationScheduler> = OnceCell::new();
static IO: OnceCell<IoScheduler> = OnceCell::new();
static SINGLE: OnceCell<SingleThreadScheduler> = OnceCell::new();

/// The shared computation pool.
pub fn computation() -> Result<ComputationScheduler, SchedulerError> {
  COMPUTATION
    .get_or_try_init(|| {
      ComputationScheduler::with_config(SchedulerConfig::default().thread_name_prefix("rx-comp-"))
    })
    .cloned()
}

/// The shared IO pool.
pub fn io() -> Result<IoScheduler, SchedulerError> {
  IO.get_or_try_init(|| {
      IoScheduler::with_config(SchedulerConfig::default().thread_name_prefix("rx-io-"))
    })
    .cloned()
}

/// The shared single-thread worker.
pub fn single() -> Result<SingleThreadScheduler, SchedulerError> {
  SINGLE
    .get_or_try_init(|| {
      SingleThreadScheduler::with_config(SchedulerConfig::default().thread_name_prefix("rx-single-"))
    })
    .cloned()
}
