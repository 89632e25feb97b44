use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{error::RxError, observer::Observer};

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// A panicking observer callback must not wedge every later signal.
#[inline]
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared, mutable, thread-safe cell.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { lock(&self.0) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// Several upstream sources (the inners of a `flat_map`) may share one
/// downstream observer. Terminal signals take the observer out, so whichever
/// source terminates first wins and everything after it is dropped.
impl<O, Item> Observer<Item> for MutArc<Option<O>>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.rc_deref_mut().as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: RxError) {
    let observer = self.rc_deref_mut().take();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let observer = self.rc_deref_mut().take();
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref_mut().as_ref().is_none_or(|o| o.is_closed()) }
}
