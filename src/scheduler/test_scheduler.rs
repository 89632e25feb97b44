use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use super::Scheduler;
use crate::rc::lock;

type Task = Box<dyn FnOnce() + Send>;

/// A scheduler that only queues tasks; the test decides when they run.
///
/// Tasks run on the thread calling [`ManualScheduler::run_one`] or
/// [`ManualScheduler::run_tasks`], which makes races between a pending task
/// and a cancellation reproducible.
///
/// ```
/// use rxlite::prelude::*;
///
/// let scheduler = ManualScheduler::new();
/// let subscription = observable::of(1)
///   .subscribe_on(scheduler.clone())
///   .subscribe_next(|_: i32| panic!("cancelled before the task ran"));
///
/// assert_eq!(scheduler.pending(), 1);
/// subscription.cancel();
/// scheduler.run_tasks();
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
  tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl ManualScheduler {
  pub fn new() -> Self { Self::default() }

  /// Number of tasks waiting to run.
  pub fn pending(&self) -> usize { lock(&self.tasks).len() }

  /// Runs the oldest pending task. Returns `false` if there was none.
  pub fn run_one(&self) -> bool {
    let task = lock(&self.tasks).pop_front();
    match task {
      Some(task) => {
        task();
        true
      }
      None => false,
    }
  }

  /// Runs tasks until the queue is empty, including tasks submitted by the
  /// tasks being run.
  pub fn run_tasks(&self) {
    while self.run_one() {}
  }
}

impl Scheduler for ManualScheduler {
  fn submit<F>(&self, task: F)
  where
    F: FnOnce() + Send + 'static,
  {
    lock(&self.tasks).push_back(Box::new(task));
  }
}
