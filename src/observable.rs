//! Observable traits and factories
//!
//! An observable is a lazily evaluated description of a stream. Nothing runs
//! until `subscribe` is called; every operator wraps the observer passed down
//! to it and forwards the wrapped observer to its upstream, back to the root
//! producer, which then pushes items forward through the adapter chain.

use crate::{
  error::RxError,
  observer::{FnMutObserver, Observer, ObserverAll},
  ops::{
    filter::{FilterOp, TryFilterOp},
    flat_map::FlatMapOp,
    map::{MapOp, TryMapOp},
    observe_on::ObserveOnOp,
    subscribe_on::SubscribeOnOp,
  },
  scheduler::Scheduler,
  subscription::Subscription,
};

pub mod create;
pub mod from_iter;
pub mod trivial;

pub use create::{create, Create};
pub use from_iter::{from_iter, of, FromIter};
pub use trivial::{empty, throw, Empty, Throw};

/// A source that can be subscribed by an observer of type `O`.
///
/// `actual_subscribe` consumes the observable: a cold observable is cloned
/// once per consumer, and each subscription runs the producer independently.
pub trait Observable<Item, O> {
  fn actual_subscribe(self, observer: O) -> Subscription;
}

/// The operator surface shared by every observable.
pub trait ObservableExt<Item>: Sized {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Like `map`, but the closure may fail. The first failure is delivered as
  /// the stream's error and nothing is forwarded after it.
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, RxError>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only those items from an Observable that pass a predicate test
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp { source: self, filter }
  }

  /// Like `filter`, but the predicate may fail; a failure terminates the
  /// stream with that error.
  fn try_filter<F>(self, filter: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Item) -> Result<bool, RxError>,
  {
    TryFilterOp { source: self, filter }
  }

  /// Maps every item to an inner observable and subscribes to it at once,
  /// forwarding inner values as they arrive.
  ///
  /// Inner completions are swallowed and the stream completes when the
  /// outer source completes, even if inner streams are still running.
  fn flat_map<Inner, F>(self, f: F) -> FlatMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Inner,
  {
    FlatMapOp::new(self, f)
  }

  /// Runs the subscription, and so the producer body, on `scheduler`.
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD>
  where
    SD: Scheduler,
  {
    SubscribeOnOp { source: self, scheduler }
  }

  /// Delivers every signal on `scheduler`, one at a time and in emission
  /// order.
  fn observe_on<SD>(self, scheduler: SD) -> ObserveOnOp<Self, SD>
  where
    SD: Scheduler,
  {
    ObserveOnOp { source: self, scheduler }
  }

  fn subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item>,
    Self: Observable<Item, O>,
  {
    self.actual_subscribe(observer)
  }

  /// Subscribes with a `next` handler only; errors are logged and dropped.
  fn subscribe_next<N>(self, next: N) -> Subscription
  where
    N: FnMut(Item),
    Self: Observable<Item, FnMutObserver<N>>,
  {
    self.actual_subscribe(FnMutObserver(next))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item),
    E: FnOnce(RxError),
    C: FnOnce(),
    Self: Observable<Item, ObserverAll<N, E, C>>,
  {
    self.actual_subscribe(ObserverAll::new(next, error, complete))
  }
}
