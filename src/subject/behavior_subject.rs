use std::sync::Arc;

use super::{SubjectCore, SubjectObserver};
use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// A subject that remembers the latest value.
///
/// A new subscriber first receives the cached value, if there is one, and
/// then everything emitted after it subscribed. Subscribing after completion
/// still replays the cached value before `complete`; subscribing after an
/// error only delivers the error.
pub struct BehaviorSubject<Item> {
  core: Arc<SubjectCore<Item>>,
}

impl<Item> Clone for BehaviorSubject<Item> {
  fn clone(&self) -> Self { BehaviorSubject { core: self.core.clone() } }
}

impl<Item> BehaviorSubject<Item>
where
  Item: Clone + Send + 'static,
{
  /// A subject with nothing cached yet.
  pub fn create() -> Self { BehaviorSubject { core: SubjectCore::new(true, None) } }

  /// A subject whose cache starts out as `value`.
  pub fn create_default(value: Item) -> Self {
    BehaviorSubject { core: SubjectCore::new(true, Some(value)) }
  }

  #[inline]
  pub fn next(&self, value: Item) { self.core.next(value) }

  #[inline]
  pub fn error(&self, err: RxError) { self.core.error(err) }

  #[inline]
  pub fn complete(&self) { self.core.complete() }

  pub fn observer(&self) -> SubjectObserver<Item> { SubjectObserver(self.core.clone()) }

  /// The cached value.
  pub fn value(&self) -> Option<Item> { self.core.value() }

  pub fn has_value(&self) -> bool { self.value().is_some() }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn is_terminated(&self) -> bool { self.core.is_terminated() }
}

impl<Item, O> Observable<Item, O> for BehaviorSubject<Item>
where
  Item: Clone + Send + 'static,
  O: Observer<Item> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Subscription { self.core.subscribe(observer) }
}

impl<Item> ObservableExt<Item> for BehaviorSubject<Item> {}
