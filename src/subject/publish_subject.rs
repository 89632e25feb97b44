use std::sync::Arc;

use super::{SubjectCore, SubjectObserver};
use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// Multicasts the signals emitted after each observer subscribed.
///
/// Handles are cheap to clone and all clones drive the same subject.
pub struct PublishSubject<Item> {
  core: Arc<SubjectCore<Item>>,
}

impl<Item> Clone for PublishSubject<Item> {
  fn clone(&self) -> Self { PublishSubject { core: self.core.clone() } }
}

impl<Item: Clone + Send + 'static> Default for PublishSubject<Item> {
  fn default() -> Self { Self::create() }
}

impl<Item> PublishSubject<Item>
where
  Item: Clone + Send + 'static,
{
  pub fn create() -> Self { PublishSubject { core: SubjectCore::new(false, None) } }

  /// Delivers `value` to every observer registered at the time of the call.
  /// Ignored once the subject terminated.
  #[inline]
  pub fn next(&self, value: Item) { self.core.next(value) }

  #[inline]
  pub fn error(&self, err: RxError) { self.core.error(err) }

  #[inline]
  pub fn complete(&self) { self.core.complete() }

  pub fn observer(&self) -> SubjectObserver<Item> { SubjectObserver(self.core.clone()) }

  /// Number of observers currently registered.
  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn is_terminated(&self) -> bool { self.core.is_terminated() }
}

impl<Item, O> Observable<Item, O> for PublishSubject<Item>
where
  Item: Clone + Send + 'static,
  O: Observer<Item> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Subscription { self.core.subscribe(observer) }
}

impl<Item> ObservableExt<Item> for PublishSubject<Item> {}
