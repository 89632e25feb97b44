//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use tracing::debug;

use crate::error::RxError;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable.
pub trait Observer<Item> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: RxError);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  ///
  /// Sources poll this before each emission so that a closed downstream
  /// (an operator whose callback failed, a cancelled subscription) stops the
  /// producer cooperatively.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// A facade for emitting items from a `create` producer.
///
/// Unlike `Observer`, which consumes `self` for `error` and `complete`, all
/// methods take `&mut self` so the producer can be handed a
/// `&mut dyn Emitter` without knowing the concrete observer chain below it.
/// Calls after a terminal signal are ignored.
pub trait Emitter<Item> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: RxError);
  fn complete(&mut self);

  /// `true` once a terminal signal went out, the subscription was cancelled
  /// or the downstream stopped accepting values.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Signals
// ============================================================================

/// One signal of a stream, used where signals are queued before delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum RxValue<Item> {
  Next(Item),
  Error(RxError),
  Complete,
}

impl<Item> RxValue<Item> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, RxValue::Next(_)) }
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (Box<dyn Observer>)
///
/// Standard Observer trait is not object-safe because terminal methods take
/// `self` by value. DynObserver mirrors the interface but adapts it for
/// vtables.
pub trait DynObserver<Item> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: RxError);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item> DynObserver<Item> for T
where
  T: Observer<Item>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: RxError) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed observer that can cross threads.
pub type BoxedObserver<'a, Item> = Box<dyn DynObserver<Item> + Send + 'a>;

impl<'a, Item> Observer<Item> for Box<dyn DynObserver<Item> + Send + 'a> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: RxError) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from a `next` closure alone.
///
/// Completion is ignored; an error reaching it is logged and dropped.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  fn error(self, err: RxError) {
    debug!(error = %err, "error reached an observer without an error handler");
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from one closure per signal.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new<Item>(next: N, error: E, complete: C) -> Self
  where
    N: FnMut(Item),
    E: FnOnce(RxError),
    C: FnOnce(),
  {
    ObserverAll { next, error, complete }
  }
}

impl<Item, N, E, C> Observer<Item> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(RxError),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, err: RxError) { (self.error)(err); }

  #[inline]
  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item> Observer<Item> for Option<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: RxError) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().is_none_or(|inner| inner.is_closed()) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use super::*;

  struct TestObserver {
    values: Arc<Mutex<Vec<i32>>>,
  }

  impl Observer<i32> for TestObserver {
    fn next(&mut self, value: i32) { self.values.lock().unwrap().push(value); }

    fn error(self, _: RxError) {}

    fn complete(self) { self.values.lock().unwrap().push(-1); }

    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn boxed_observer_forwards() {
    let values = Arc::new(Mutex::new(vec![]));
    let mut boxed: BoxedObserver<'_, i32> = Box::new(TestObserver { values: values.clone() });
    boxed.next(1);
    boxed.next(2);
    assert!(!boxed.is_closed());
    boxed.complete();
    assert_eq!(*values.lock().unwrap(), vec![1, 2, -1]);
  }

  #[test]
  fn closure_as_observer() {
    let mut count = 0;
    let mut closure_obs = FnMutObserver(|v: i32| {
      count += v;
    });

    closure_obs.next(10);
    closure_obs.next(20);
    closure_obs.complete();
    assert_eq!(count, 30);
  }

  #[test]
  fn observer_all_routes_terminal() {
    let mut err = None;
    let obs = ObserverAll::new(|_: i32| {}, |e| err = Some(e), || panic!("not completed"));
    obs.error(RxError::msg("boom"));
    assert_eq!(err, Some(RxError::msg("boom")));
  }

  #[test]
  fn none_is_closed() {
    let none: Option<FnMutObserver<fn(i32)>> = None;
    assert!(Observer::<i32>::is_closed(&none));
    let some = Some(FnMutObserver(|_: i32| {}));
    assert!(!Observer::<i32>::is_closed(&some));
  }

  #[test]
  fn terminal_signals() {
    assert!(!RxValue::Next(1).is_terminal());
    assert!(RxValue::<i32>::Complete.is_terminal());
    assert!(RxValue::<i32>::Error(RxError::msg("x")).is_terminal());
  }
}
