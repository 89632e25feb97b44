use std::sync::{Arc, Mutex};

use crate::{
  error::RxError,
  observer::{BoxedObserver, Observer},
  rc::lock,
};

/// One registered observer.
///
/// The slot is locked while a signal is delivered to it, so a single observer
/// never runs concurrently with itself. Terminal signals take the observer out
/// of the slot; anything delivered later finds it empty.
pub(crate) type Entry<Item> = Arc<Mutex<Option<BoxedObserver<'static, Item>>>>;

/// Copy-on-write list of observers in registration order.
///
/// Cloning is a reference count bump, so a broadcast takes a snapshot and
/// iterates it without holding the subject's lock; `add` and `remove` copy
/// the list only while a snapshot is still alive.
pub(crate) struct Subscribers<Item> {
  observers: Arc<Vec<(usize, Entry<Item>)>>,
}

impl<Item> Default for Subscribers<Item> {
  fn default() -> Self { Subscribers { observers: Arc::new(Vec::new()) } }
}

impl<Item> Clone for Subscribers<Item> {
  fn clone(&self) -> Self { Subscribers { observers: self.observers.clone() } }
}

impl<Item> Subscribers<Item> {
  pub(crate) fn add(&mut self, id: usize, entry: Entry<Item>) {
    Arc::make_mut(&mut self.observers).push((id, entry));
  }

  pub(crate) fn remove(&mut self, id: usize) -> bool {
    let Some(idx) = self.observers.iter().position(|(i, _)| *i == id) else { return false };
    Arc::make_mut(&mut self.observers).remove(idx);
    true
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.observers.len() }

  /// Empties the list, handing back what it held.
  pub(crate) fn take_all(&mut self) -> Subscribers<Item> { std::mem::take(self) }

  /// Delivers `value` to every observer, cloning it for all but the last.
  pub(crate) fn broadcast_value(&self, value: Item)
  where
    Item: Clone,
  {
    let mut iter = self.observers.iter().peekable();
    while let Some((_, entry)) = iter.next() {
      let mut slot = lock(entry);
      let Some(observer) = slot.as_mut() else { continue };
      if observer.is_closed() {
        continue;
      }
      if iter.peek().is_some() {
        observer.next(value.clone());
      } else {
        observer.next(value);
        break;
      }
    }
  }

  pub(crate) fn broadcast_error(&self, err: RxError) {
    for (_, entry) in self.observers.iter() {
      let observer = lock(entry).take();
      if let Some(observer) = observer {
        observer.error(err.clone());
      }
    }
  }

  pub(crate) fn broadcast_complete(&self) {
    for (_, entry) in self.observers.iter() {
      let observer = lock(entry).take();
      if let Some(observer) = observer {
        observer.complete();
      }
    }
  }
}
