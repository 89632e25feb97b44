use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// source stops early once its observer reports `is_closed`.
///
/// # Example
///
/// ```
/// use rxlite::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter(0..10).subscribe_next(|v| sum += v);
/// assert_eq!(sum, 45);
/// ```
pub fn from_iter<Iter>(iter: Iter) -> FromIter<Iter>
where
  Iter: IntoIterator,
{
  FromIter(iter)
}

/// Creates an observable producing a single value, then completing.
pub fn of<Item>(v: Item) -> FromIter<std::iter::Once<Item>> { FromIter(std::iter::once(v)) }

#[derive(Clone)]
pub struct FromIter<Iter>(Iter);

impl<Iter, O> Observable<Iter::Item, O> for FromIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item>,
{
  fn actual_subscribe(self, mut observer: O) -> Subscription {
    for v in self.0 {
      if observer.is_closed() {
        return Subscription::new();
      }
      observer.next(v);
    }
    if !observer.is_closed() {
      observer.complete();
    }
    Subscription::new()
  }
}

impl<Iter: IntoIterator> ObservableExt<Iter::Item> for FromIter<Iter> {}
