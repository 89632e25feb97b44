use std::marker::PhantomData;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// Creates an observable that emits no items and completes immediately.
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

/// Creates an observable that emits no items and terminates with `err`.
pub fn throw<Item>(err: RxError) -> Throw<Item> { Throw(err, PhantomData) }

pub struct Empty<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, O> Observable<Item, O> for Empty<Item>
where
  O: Observer<Item>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    observer.complete();
    Subscription::cancelled()
  }
}

impl<Item> ObservableExt<Item> for Empty<Item> {}

pub struct Throw<Item>(RxError, PhantomData<fn() -> Item>);

impl<Item> Clone for Throw<Item> {
  fn clone(&self) -> Self { Throw(self.0.clone(), PhantomData) }
}

impl<Item, O> Observable<Item, O> for Throw<Item>
where
  O: Observer<Item>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    observer.error(self.0);
    Subscription::cancelled()
  }
}

impl<Item> ObservableExt<Item> for Throw<Item> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn empty_only_completes() {
    let mut hits = 0;
    let mut completed = false;
    let subscription = observable::empty::<i32>().subscribe_all(
      |_| hits += 1,
      |_| panic!("no error"),
      || completed = true,
    );
    assert_eq!(hits, 0);
    assert!(completed);
    assert!(subscription.is_cancelled());
  }

  #[test]
  fn throw_only_errors() {
    let mut err = None;
    observable::throw::<i32>(RxError::msg("nope")).subscribe_all(
      |_| panic!("no items"),
      |e| err = Some(e),
      || panic!("no completion"),
    );
    assert_eq!(err, Some(RxError::msg("nope")));
  }
}
