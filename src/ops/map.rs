use std::marker::PhantomData;

use tracing::debug;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<fn(Item)>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, Item> Clone for MapOp<S, F, Item> {
  fn clone(&self) -> Self { MapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, S, F, O> Observable<B, O> for MapOp<S, F, Item>
where
  S: Observable<Item, MapObserver<O, F>>,
  F: FnMut(Item) -> B,
  O: Observer<B>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    self.source.actual_subscribe(MapObserver { observer, func: self.func })
  }
}

impl<Item, B, S, F> ObservableExt<B> for MapOp<S, F, Item>
where
  S: ObservableExt<Item>,
  F: FnMut(Item) -> B,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, B, O, F> Observer<Item> for MapObserver<O, F>
where
  O: Observer<B>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  #[inline]
  fn error(self, err: RxError) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _p: PhantomData<fn(Item)>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func, _p: PhantomData } }
}

impl<S: Clone, F: Clone, Item> Clone for TryMapOp<S, F, Item> {
  fn clone(&self) -> Self { TryMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, S, F, O> Observable<B, O> for TryMapOp<S, F, Item>
where
  S: Observable<Item, TryMapObserver<O, F>>,
  F: FnMut(Item) -> Result<B, RxError>,
  O: Observer<B>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    self.source.actual_subscribe(TryMapObserver { observer: Some(observer), func: self.func })
  }
}

impl<Item, B, S, F> ObservableExt<B> for TryMapOp<S, F, Item>
where
  S: ObservableExt<Item>,
  F: FnMut(Item) -> Result<B, RxError>,
{
}

/// Once the callback fails the downstream observer is taken out: the error is
/// its last signal and the adapter reports itself closed to the source.
pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
}

impl<Item, B, O, F> Observer<Item> for TryMapObserver<O, F>
where
  O: Observer<B>,
  F: FnMut(Item) -> Result<B, RxError>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    match (self.func)(value) {
      Ok(mapped) => observer.next(mapped),
      Err(err) => {
        debug!(error = %err, "map callback failed");
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
  }

  fn error(self, err: RxError) {
    if let Some(observer) = self.observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.as_ref().is_none_or(|o| o.is_closed()) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn doubles_in_order() {
    let mut items = vec![];
    let mut completed = 0;
    observable::create(|emitter: &mut dyn Emitter<i32>| {
      emitter.next(1);
      emitter.next(2);
      emitter.next(3);
      emitter.complete();
      Ok(())
    })
    .map(|x| x * 2)
    .subscribe_all(|v| items.push(v), |_| {}, || completed += 1);

    assert_eq!(items, vec![2, 4, 6]);
    assert_eq!(completed, 1);
  }

  #[test]
  fn error_passes_through() {
    let mut err = None;
    observable::throw::<i32>(RxError::msg("upstream"))
      .map(|x| x + 1)
      .subscribe_all(|_| {}, |e| err = Some(e), || {});
    assert_eq!(err, Some(RxError::msg("upstream")));
  }

  #[test]
  fn map_types_mixed() {
    let mut i = 0;
    observable::from_iter(vec!['a', 'b', 'c']).map(|_v| 1).subscribe_next(|v| i += v);
    assert_eq!(i, 3);
  }

  #[test]
  fn callback_failure_is_delivered_once() {
    let mut items = vec![];
    let mut errors = vec![];
    let mut attempts = 0;

    observable::create(|emitter: &mut dyn Emitter<i32>| {
      for v in 1..=5 {
        emitter.next(v);
      }
      emitter.complete();
      Ok(())
    })
    .try_map(|x| {
      attempts += 1;
      if x == 2 { Err(RxError::callback("two is not allowed")) } else { Ok(x * 10) }
    })
    .subscribe_all(|v| items.push(v), |e| errors.push(e), || panic!("must not complete"));

    assert_eq!(items, vec![10]);
    assert_eq!(errors, vec![RxError::callback("two is not allowed")]);
    // the adapter stops calling the callback after the failure
    assert_eq!(attempts, 2);
  }

  #[test]
  fn producer_sees_closed_after_callback_failure() {
    let mut emitted = 0;
    observable::create(|emitter: &mut dyn Emitter<i32>| {
      let mut v = 0;
      while !emitter.is_closed() {
        emitter.next(v);
        v += 1;
      }
      Ok(())
    })
    .try_map(|x| if x < 3 { Ok(x) } else { Err(RxError::callback("stop")) })
    .subscribe_all(|_| emitted += 1, |_| {}, || {});

    assert_eq!(emitted, 3);
  }
}
