//! Hot, multicast sources.
//!
//! A subject is fed from the producer side through `next`, `error` and
//! `complete`, and fans every signal out to the observers currently
//! subscribed to it. The two sides are separate views over one shared state:
//! the subject handle itself is the subscription side, and
//! [`observer()`](PublishSubject::observer) hands out the emission side as an
//! [`Observer`] that can be subscribed to another stream.
//!
//! Once a subject has completed or failed it ignores further producer calls,
//! and late subscribers receive the terminal signal straight away.
//!
//! Delivery to a single observer is serialized. An observer must not emit into
//! the subject that is currently delivering to it.

use std::sync::Arc;

use crate::{error::RxError, observer::Observer};

mod behavior_subject;
mod publish_subject;
mod subject_core;
mod subscribers;

pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
use subject_core::SubjectCore;

/// The emission side of a subject.
///
/// Lets a subject act as the observer of another stream:
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use rxlite::prelude::*;
///
/// let subject = PublishSubject::<i32>::create();
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// subject.clone().subscribe_next(move |v| c_seen.lock().unwrap().push(v));
///
/// observable::from_iter(1..=3).subscribe(subject.observer());
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// assert!(subject.is_terminated());
/// ```
pub struct SubjectObserver<Item>(Arc<SubjectCore<Item>>);

impl<Item> Clone for SubjectObserver<Item> {
  fn clone(&self) -> Self { SubjectObserver(self.0.clone()) }
}

impl<Item> Observer<Item> for SubjectObserver<Item>
where
  Item: Clone + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(value) }

  #[inline]
  fn error(self, err: RxError) { self.0.error(err) }

  #[inline]
  fn complete(self) { self.0.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_terminated() }
}
