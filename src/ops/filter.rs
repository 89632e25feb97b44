use tracing::debug;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// Emit only those items from an Observable that pass a predicate test
///
/// # Example
///
/// ```
/// use rxlite::prelude::*;
///
/// let mut coll = vec![];
/// observable::from_iter(0..10).filter(|v| *v % 2 == 0).subscribe_next(|v| coll.push(v));
///
/// // only even numbers received.
/// assert_eq!(coll, vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<Item, S, F, O> Observable<Item, O> for FilterOp<S, F>
where
  S: Observable<Item, FilterObserver<O, F>>,
  F: FnMut(&Item) -> bool,
  O: Observer<Item>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    self.source.actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

impl<Item, S, F> ObservableExt<Item> for FilterOp<S, F>
where
  S: ObservableExt<Item>,
  F: FnMut(&Item) -> bool,
{
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, O, F> Observer<Item> for FilterObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: RxError) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct TryFilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<Item, S, F, O> Observable<Item, O> for TryFilterOp<S, F>
where
  S: Observable<Item, TryFilterObserver<O, F>>,
  F: FnMut(&Item) -> Result<bool, RxError>,
  O: Observer<Item>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    self.source.actual_subscribe(TryFilterObserver { observer: Some(observer), filter: self.filter })
  }
}

impl<Item, S, F> ObservableExt<Item> for TryFilterOp<S, F>
where
  S: ObservableExt<Item>,
  F: FnMut(&Item) -> Result<bool, RxError>,
{
}

pub struct TryFilterObserver<O, F> {
  observer: Option<O>,
  filter: F,
}

impl<Item, O, F> Observer<Item> for TryFilterObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> Result<bool, RxError>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    match (self.filter)(&value) {
      Ok(true) => observer.next(value),
      Ok(false) => {}
      Err(err) => {
        debug!(error = %err, "filter predicate failed");
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
  fn keeps_even_items() {
    let mut items = vec![];
    let mut completed = 0;
    observable::create(|emitter: &mut dyn Emitter<i32>| {
      for v in 1..=4 {
        emitter.next(v);
      }
      emitter.complete();
      Ok(())
    })
    .filter(|x| x % 2 == 0)
    .subscribe_all(|v| items.push(v), |_| {}, || completed += 1);

    assert_eq!(items, vec![2, 4]);
    assert_eq!(completed, 1);
  }

  #[test]
  fn subsequence_without_duplicates() {
    let source: Vec<u32> = vec![5, 3, 8, 8, 1, 10, 7, 2];
    let mut items = vec![];
    observable::from_iter(source.clone()).filter(|x| *x > 4).subscribe_next(|v| items.push(v));

    let expected: Vec<u32> = source.into_iter().filter(|x| *x > 4).collect();
    assert_eq!(items, expected);
  }

  #[test]
  fn predicate_failure_terminates() {
    let mut items = vec![];
    let mut errors = vec![];
    observable::from_iter(vec!["1", "2", "x", "4"])
      .try_filter(|s| s.parse::<i32>().map(|v| v > 1).map_err(RxError::from_error))
      .subscribe_all(|v| items.push(v), |e| errors.push(e), || panic!("must not complete"));

    assert_eq!(items, vec!["2"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "invalid digit found in string");
  }
}
