use tracing::trace;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
  subscription::Subscription,
};

/// Moves the subscription, and so the work a cold producer does while being
/// subscribed, onto a scheduler.
///
/// The returned subscription is live at once. Cancelling it before the
/// scheduled task starts means the upstream is never subscribed; cancelling
/// it later cancels the upstream subscription.
#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<Item, S, SD, O> Observable<Item, O> for SubscribeOnOp<S, SD>
where
  S: Observable<Item, SubscribeOnObserver<O>> + Send + 'static,
  O: Observer<Item> + Send + 'static,
  SD: Scheduler,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    let subscription = Subscription::new();
    let handle = subscription.clone();
    let source = self.source;
    self.scheduler.submit(move || {
      if handle.is_cancelled() {
        trace!("subscription cancelled before subscribe_on task started");
        return;
      }
      let upstream =
        source.actual_subscribe(SubscribeOnObserver { observer, subscription: handle.clone() });
      handle.add(upstream);
    });
    subscription
  }
}

impl<Item, S, SD> ObservableExt<Item> for SubscribeOnOp<S, SD> where S: ObservableExt<Item> {}

/// Stops forwarding once the outer subscription is cancelled, even if the
/// upstream keeps producing.
pub struct SubscribeOnObserver<O> {
  observer: O,
  subscription: Subscription,
}

impl<Item, O> Observer<Item> for SubscribeOnObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_cancelled() {
      self.observer.next(value);
    }
  }

  fn error(self, err: RxError) {
    if !self.subscription.is_cancelled() {
      self.observer.error(err);
    }
  }

  fn complete(self) {
    if !self.subscription.is_cancelled() {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_cancelled() || self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::{
    sync::{
      atomic::{AtomicBool, Ordering},
      mpsc, Arc,
    },
    thread,
    time::Duration,
  };

  use crate::prelude::*;

  #[test]
  fn cancel_before_start_skips_producer() {
    let scheduler = ManualScheduler::new();
    let ran = Arc::new(AtomicBool::new(false));
    let c_ran = ran.clone();

    let subscription = observable::create(move |emitter: &mut dyn Emitter<i32>| {
      c_ran.store(true, Ordering::SeqCst);
      emitter.next(1);
      Ok(())
    })
    .subscribe_on(scheduler.clone())
    .subscribe_next(|_| panic!("must not receive values"));

    assert!(!subscription.is_cancelled());
    assert_eq!(scheduler.pending(), 1);
    subscription.cancel();
    scheduler.run_tasks();
    assert!(!ran.load(Ordering::SeqCst));
  }

  #[test]
  fn producer_runs_on_scheduler() {
    let scheduler = ManualScheduler::new();
    let (tx, rx) = mpsc::channel();

    observable::from_iter(vec![1, 2, 3]).subscribe_on(scheduler.clone()).subscribe_all(
      move |v| tx.send(v).unwrap(),
      |e| panic!("unexpected error {e}"),
      || {},
    );

    assert!(rx.try_recv().is_err());
    scheduler.run_tasks();
    let got: Vec<_> = rx.try_iter().collect();
    assert_eq!(got, vec![1, 2, 3]);
  }

  #[test]
  fn producer_leaves_calling_thread() {
    let caller = thread::current().id();
    let (tx, rx) = mpsc::channel();

    observable::create(move |emitter: &mut dyn Emitter<thread::ThreadId>| {
      emitter.next(thread::current().id());
      emitter.complete();
      Ok(())
    })
    .subscribe_on(io().unwrap())
    .subscribe_next(move |id| tx.send(id).unwrap());

    let producer_thread = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(producer_thread, caller);
  }

  #[test]
  fn cancel_after_start_stops_forwarding() {
    let scheduler = ManualScheduler::new();
    let subject = PublishSubject::<i32>::create();
    let (tx, rx) = mpsc::channel();

    let subscription =
      subject.clone().subscribe_on(scheduler.clone()).subscribe_next(move |v| tx.send(v).unwrap());
    scheduler.run_tasks();
    subject.next(1);
    subscription.cancel();
    subject.next(2);

    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(subject.observer_count(), 0);
  }
}
