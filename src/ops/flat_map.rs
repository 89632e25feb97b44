use std::marker::PhantomData;

use tracing::trace;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  subscription::Subscription,
};

/// Maps each item to an inner observable and merges the inner values into one
/// stream.
///
/// This is a deliberately simplified merge:
///
/// - inner values are forwarded as they arrive, with no ordering between
///   different inner streams;
/// - an inner error is forwarded and terminates the whole stream;
/// - an inner completion is swallowed;
/// - the stream completes when the outer source completes, even while inner
///   streams are still running. Those inner streams are cancelled at that
///   point.
///
/// Cancelling the returned subscription cancels every inner subscription too.
pub struct FlatMapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<fn(Item)>,
}

impl<S, F, Item> FlatMapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { FlatMapOp { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, Item> Clone for FlatMapOp<S, F, Item> {
  fn clone(&self) -> Self { FlatMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Inner, S, F, O> Observable<B, O> for FlatMapOp<S, F, Item>
where
  S: Observable<Item, FlatMapObserver<O, F, B>>,
  F: FnMut(Item) -> Inner,
  Inner: Observable<B, FlatMapInnerObserver<O>>,
  O: Observer<B>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    let inners = Subscription::new();
    let outer = FlatMapObserver {
      observer: MutArc::own(Some(observer)),
      func: self.func,
      inners: inners.clone(),
      _p: PhantomData,
    };
    let subscription = self.source.actual_subscribe(outer);
    subscription.add(inners);
    subscription
  }
}

impl<Item, B, Inner, S, F> ObservableExt<B> for FlatMapOp<S, F, Item>
where
  S: ObservableExt<Item>,
  F: FnMut(Item) -> Inner,
  Inner: ObservableExt<B>,
{
}

pub struct FlatMapObserver<O, F, B> {
  observer: MutArc<Option<O>>,
  func: F,
  inners: Subscription,
  _p: PhantomData<fn(B)>,
}

impl<Item, B, Inner, O, F> Observer<Item> for FlatMapObserver<O, F, B>
where
  F: FnMut(Item) -> Inner,
  Inner: Observable<B, FlatMapInnerObserver<O>>,
  O: Observer<B>,
{
  fn next(&mut self, value: Item) {
    if self.inners.is_cancelled() || Observer::<B>::is_closed(&self.observer) {
      return;
    }
    let inner = (self.func)(value);
    let observer =
      FlatMapInnerObserver { observer: self.observer.clone(), inners: self.inners.clone() };
    let subscription = inner.actual_subscribe(observer);
    self.inners.add(subscription);
  }

  fn error(self, err: RxError) {
    self.inners.cancel();
    Observer::<B>::error(self.observer, err);
  }

  fn complete(self) {
    trace!(inners_alive = !self.inners.is_cancelled(), "outer stream of flat_map completed");
    self.inners.cancel();
    Observer::<B>::complete(self.observer);
  }

  fn is_closed(&self) -> bool {
    self.inners.is_cancelled() || Observer::<B>::is_closed(&self.observer)
  }
}

/// Observer handed to every inner observable; shares the downstream observer
/// with the outer adapter and its sibling inners.
pub struct FlatMapInnerObserver<O> {
  observer: MutArc<Option<O>>,
  inners: Subscription,
}

impl<B, O> Observer<B> for FlatMapInnerObserver<O>
where
  O: Observer<B>,
{
  fn next(&mut self, value: B) { self.observer.next(value) }

  fn error(self, err: RxError) {
    self.inners.cancel();
    Observer::<B>::error(self.observer, err);
  }

  /// Inner completion never completes the merged stream.
  fn complete(self) {}

  fn is_closed(&self) -> bool {
    self.inners.is_cancelled() || Observer::<B>::is_closed(&self.observer)
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use crate::prelude::*;

  #[test]
  fn flattens_inner_streams() {
    let mut items = vec![];
    let mut completed = 0;

    observable::from_iter(vec![1, 2])
      .flat_map(|x| {
        observable::create(move |emitter: &mut dyn Emitter<String>| {
          emitter.next(format!("A{x}"));
          emitter.next(format!("B{x}"));
          emitter.complete();
          Ok(())
        })
      })
      .subscribe_all(|v| items.push(v), |e| panic!("unexpected error {e}"), || completed += 1);

    assert_eq!(items, vec!["A1", "B1", "A2", "B2"]);
    assert_eq!(completed, 1);
  }

  #[test]
  fn inner_error_terminates_outer() {
    let mut items = vec![];
    let mut errors = vec![];

    observable::from_iter(1..=3)
      .flat_map(|x| {
        observable::create(move |emitter: &mut dyn Emitter<i32>| {
          if x == 2 {
            return Err(RxError::producer("inner two failed"));
          }
          emitter.next(x * 100);
          emitter.complete();
          Ok(())
        })
      })
      .subscribe_all(|v| items.push(v), |e| errors.push(e), || panic!("must not complete"));

    assert_eq!(items, vec![100]);
    assert_eq!(errors, vec![RxError::producer("inner two failed")]);
  }

  #[test]
  fn outer_completion_does_not_wait_for_inners() {
    // The live subject below never completes, yet the merged stream completes
    // with the outer source and the inner subscription is released.
    let inner = PublishSubject::<i32>::create();
    let log = Arc::new(Mutex::new(vec![]));
    let (n, c) = (log.clone(), log.clone());

    let c_inner = inner.clone();
    observable::of(())
      .flat_map(move |_| c_inner.clone())
      .subscribe_all(
        move |v| n.lock().unwrap().push(format!("next {v}")),
        |_| {},
        move || c.lock().unwrap().push("complete".to_string()),
      );

    assert_eq!(*log.lock().unwrap(), vec!["complete"]);
    assert_eq!(inner.observer_count(), 0);
    inner.next(1);
    assert_eq!(*log.lock().unwrap(), vec!["complete"]);
  }

  #[test]
  fn inner_completion_is_swallowed() {
    let completed = Arc::new(AtomicUsize::new(0));
    let c_completed = completed.clone();
    let outer = PublishSubject::<i32>::create();
    let subscription = outer.clone().flat_map(observable::of).subscribe_all(
      |_| {},
      |_| {},
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );

    outer.next(1);
    outer.next(2);
    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert!(!subscription.is_cancelled());
    outer.complete();
    assert_eq!(completed.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn cancel_reaches_inner_subscriptions() {
    let inner = PublishSubject::<i32>::create();
    let outer = PublishSubject::<()>::create();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();

    let c_inner = inner.clone();
    let subscription = outer
      .clone()
      .flat_map(move |_| c_inner.clone())
      .subscribe_next(move |v| c_seen.lock().unwrap().push(v));

    outer.next(());
    inner.next(1);
    assert_eq!(inner.observer_count(), 1);

    subscription.cancel();
    assert_eq!(inner.observer_count(), 0);
    inner.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }
}
