use std::{
  collections::VecDeque,
  mem,
  sync::{Arc, Mutex},
};

use tracing::trace;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::{Observer, RxValue},
  rc::lock,
  scheduler::Scheduler,
  subscription::Subscription,
};

/// Re-emits every signal of the source on `scheduler`.
///
/// Signals are queued in arrival order and delivered by a single drain task at
/// a time, so the downstream observer never runs concurrently with itself and
/// sees items in the order the source produced them, even on a multi-threaded
/// scheduler.
#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<Item, S, SD, O> Observable<Item, O> for ObserveOnOp<S, SD>
where
  S: Observable<Item, ObserveOnObserver<O, Item, SD>>,
  O: Observer<Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    let subscription = Subscription::new();
    let queue = Arc::new(DrainQueue {
      state: Mutex::new(QueueState {
        signals: VecDeque::new(),
        draining: false,
        terminated: false,
      }),
      observer: Mutex::new(Some(observer)),
      subscription: subscription.clone(),
    });
    let upstream =
      self.source.actual_subscribe(ObserveOnObserver { queue, scheduler: self.scheduler });
    subscription.add(upstream);
    subscription
  }
}

impl<Item, S, SD> ObservableExt<Item> for ObserveOnOp<S, SD> where S: ObservableExt<Item> {}

struct QueueState<Item> {
  signals: VecDeque<RxValue<Item>>,
  draining: bool,
  terminated: bool,
}

struct DrainQueue<O, Item> {
  state: Mutex<QueueState<Item>>,
  observer: Mutex<Option<O>>,
  subscription: Subscription,
}

impl<O, Item> DrainQueue<O, Item>
where
  O: Observer<Item> + Send + 'static,
  Item: Send + 'static,
{
  fn push<SD: Scheduler>(self: &Arc<Self>, signal: RxValue<Item>, scheduler: &SD) {
    if self.subscription.is_cancelled() {
      return;
    }
    let start_drain = {
      let mut state = lock(&self.state);
      if state.terminated {
        return;
      }
      state.terminated = signal.is_terminal();
      state.signals.push_back(signal);
      !mem::replace(&mut state.draining, true)
    };
    if start_drain {
      Self::schedule_drain(self.clone(), scheduler.clone());
    }
  }

  fn schedule_drain<SD: Scheduler>(queue: Arc<Self>, scheduler: SD) {
    let next = scheduler.clone();
    scheduler.submit(move || queue.drain(next));
  }

  /// Delivers the queued batch, then hands the rest to a fresh task so one
  /// busy stream cannot monopolize a worker.
  fn drain<SD: Scheduler>(self: Arc<Self>, scheduler: SD) {
    let mut release = DrainRelease { state: &self.state, armed: true };
    let batch = mem::take(&mut lock(&self.state).signals);
    {
      let mut observer = lock(&self.observer);
      for signal in batch {
        if self.subscription.is_cancelled() {
          observer.take();
          break;
        }
        match signal {
          RxValue::Next(value) => {
            if let Some(observer) = observer.as_mut() {
              observer.next(value);
            }
          }
          RxValue::Error(err) => {
            if let Some(observer) = observer.take() {
              observer.error(err);
            }
          }
          RxValue::Complete => {
            if let Some(observer) = observer.take() {
              observer.complete();
            }
          }
        }
      }
    }

    release.armed = false;
    drop(release);
    let more = {
      let mut state = lock(&self.state);
      if state.signals.is_empty() {
        state.draining = false;
        false
      } else {
        true
      }
    };
    if more {
      trace!("observe_on queue refilled while draining, rescheduling");
      Self::schedule_drain(self, scheduler);
    }
  }
}

/// Clears the drainer flag if delivery unwinds, so later signals start a new
/// drain instead of queueing forever.
struct DrainRelease<'a, Item> {
  state: &'a Mutex<QueueState<Item>>,
  armed: bool,
}

impl<Item> Drop for DrainRelease<'_, Item> {
  fn drop(&mut self) {
    if self.armed {
      lock(self.state).draining = false;
    }
  }
}

pub struct ObserveOnObserver<O, Item, SD> {
  queue: Arc<DrainQueue<O, Item>>,
  scheduler: SD,
}

impl<Item, O, SD> Observer<Item> for ObserveOnObserver<O, Item, SD>
where
  O: Observer<Item> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) { self.queue.push(RxValue::Next(value), &self.scheduler) }

  fn error(self, err: RxError) { self.queue.push(RxValue::Error(err), &self.scheduler) }

  fn complete(self) { self.queue.push(RxValue::Complete, &self.scheduler) }

  fn is_closed(&self) -> bool {
    self.queue.subscription.is_cancelled() || lock(&self.queue.state).terminated
  }
}

#[cfg(test)]
mod test {
  use std::{
    panic::{self, AssertUnwindSafe},
    sync::mpsc,
    time::Duration,
  };

  use crate::prelude::*;

  #[test]
  fn delivery_is_deferred_to_scheduler() {
    let scheduler = ManualScheduler::new();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();

    observable::from_iter(vec![1, 2, 3]).observe_on(scheduler.clone()).subscribe_all(
      move |v| tx.send(RxValue::Next(v)).unwrap(),
      |e| panic!("unexpected error {e}"),
      move || c_tx.send(RxValue::Complete).unwrap(),
    );

    assert!(rx.try_recv().is_err());
    // One drain task carries the whole batch.
    assert_eq!(scheduler.pending(), 1);
    scheduler.run_tasks();
    assert_eq!(
      rx.try_iter().collect::<Vec<_>>(),
      vec![RxValue::Next(1), RxValue::Next(2), RxValue::Next(3), RxValue::Complete]
    );
  }

  #[test]
  fn preserves_order_on_thread_pool() {
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();

    observable::from_iter(0..1000).observe_on(computation().unwrap()).subscribe_all(
      move |v| tx.send(RxValue::Next(v)).unwrap(),
      |e| panic!("unexpected error {e}"),
      move || c_tx.send(RxValue::Complete).unwrap(),
    );

    let mut got = vec![];
    loop {
      match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        RxValue::Next(v) => got.push(v),
        RxValue::Complete => break,
        RxValue::Error(e) => panic!("unexpected error {e}"),
      }
    }
    assert_eq!(got, (0..1000).collect::<Vec<_>>());
  }

  #[test]
  fn error_is_delivered_after_values() {
    let scheduler = ManualScheduler::new();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();

    observable::create(|emitter: &mut dyn Emitter<i32>| {
      emitter.next(1);
      emitter.error(RxError::msg("broken pipe"));
      emitter.next(2);
      Ok(())
    })
    .observe_on(scheduler.clone())
    .subscribe_all(
      move |v| tx.send(RxValue::Next(v)).unwrap(),
      move |e| c_tx.send(RxValue::Error(e)).unwrap(),
      || panic!("must not complete"),
    );

    scheduler.run_tasks();
    assert_eq!(
      rx.try_iter().collect::<Vec<_>>(),
      vec![RxValue::Next(1), RxValue::Error(RxError::msg("broken pipe"))]
    );
  }

  #[test]
  fn cancel_drops_queued_signals() {
    let scheduler = ManualScheduler::new();
    let subject = PublishSubject::<i32>::create();
    let (tx, rx) = mpsc::channel();

    let subscription = subject
      .clone()
      .observe_on(scheduler.clone())
      .subscribe_next(move |v| tx.send(v).unwrap());
    subject.next(1);
    subject.next(2);
    subscription.cancel();
    subject.next(3);
    scheduler.run_tasks();

    assert!(rx.try_recv().is_err());
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn signals_pushed_while_draining_are_rescheduled() {
    let scheduler = ManualScheduler::new();
    let subject = PublishSubject::<i32>::create();
    let (tx, rx) = mpsc::channel();

    subject.clone().observe_on(scheduler.clone()).subscribe_next(move |v| tx.send(v).unwrap());
    subject.next(1);
    assert!(scheduler.run_one());
    subject.next(2);
    subject.next(3);
    scheduler.run_tasks();

    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
  }

  #[test]
  fn panicking_observer_does_not_stall_the_queue() {
    let scheduler = ManualScheduler::new();
    let subject = PublishSubject::<i32>::create();
    let (tx, rx) = mpsc::channel();

    subject.clone().observe_on(scheduler.clone()).subscribe_next(move |v| {
      if v == 1 {
        panic!("observer failed on {v}");
      }
      tx.send(v).unwrap();
    });
    subject.next(1);
    assert!(panic::catch_unwind(AssertUnwindSafe(|| scheduler.run_one())).is_err());

    subject.next(2);
    assert_eq!(scheduler.pending(), 1);
    scheduler.run_tasks();
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![2]);
  }
}
