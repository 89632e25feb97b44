use futures::executor::ThreadPool;
use tracing::debug;

use super::{Scheduler, SchedulerConfig};
use crate::error::SchedulerError;

fn build_pool(pool_size: usize, config: &SchedulerConfig) -> Result<ThreadPool, SchedulerError> {
  config.validate()?;
  let pool =
    ThreadPool::builder().pool_size(pool_size).name_prefix(&config.thread_name_prefix).create()?;
  debug!(pool_size, prefix = %config.thread_name_prefix, "worker pool created");
  Ok(pool)
}

/// A fixed-size pool for CPU-bound work.
#[derive(Clone, Debug)]
pub struct ComputationScheduler {
  pool: ThreadPool,
}

impl ComputationScheduler {
  /// A dedicated pool with `config.pool_size` workers.
  pub fn with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
    Ok(ComputationScheduler { pool: build_pool(config.pool_size, &config)? })
  }
}

impl Scheduler for ComputationScheduler {
  #[inline]
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.pool.submit(task)
  }
}

/// One dedicated worker; tasks run one after another in submission order.
#[derive(Clone, Debug)]
pub struct SingleThreadScheduler {
  pool: ThreadPool,
}

impl SingleThreadScheduler {
  /// A dedicated worker. `config.pool_size` is ignored.
  pub fn with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
    Ok(SingleThreadScheduler { pool: build_pool(1, &config)? })
  }
}

impl Scheduler for SingleThreadScheduler {
  #[inline]
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.pool.submit(task)
  }
}
