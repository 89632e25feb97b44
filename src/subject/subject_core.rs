use std::{
  cell::RefCell,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, Weak,
  },
};

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::subscribers::{Entry, Subscribers};
use crate::{
  error::RxError,
  observer::{BoxedObserver, Observer},
  rc::lock,
  subscription::{Registry, Subscription},
};

thread_local! {
  /// Subjects whose observers are being called on this thread.
  static DELIVERING: RefCell<SmallVec<[usize; 4]>> = RefCell::new(SmallVec::new());
}

/// Marks a subject as delivering on the current thread until dropped, unwinding
/// included.
struct DeliveryGuard(usize);

impl DeliveryGuard {
  fn enter(subject: usize) -> Self {
    DELIVERING.with(|d| d.borrow_mut().push(subject));
    DeliveryGuard(subject)
  }
}

impl Drop for DeliveryGuard {
  fn drop(&mut self) {
    DELIVERING.with(|d| {
      let mut d = d.borrow_mut();
      if let Some(pos) = d.iter().rposition(|s| *s == self.0) {
        d.remove(pos);
      }
    });
  }
}

#[derive(Clone, Debug)]
pub(crate) enum Terminal {
  Active,
  Completed,
  Failed(RxError),
}

struct SubjectState<Item> {
  observers: Subscribers<Item>,
  terminal: Terminal,
  value: Option<Item>,
  /// Keep the latest value and hand it to new subscribers.
  replay: bool,
}

/// State shared by every handle of one subject.
///
/// Producer calls and subscribe/cancel may come from any thread. The state
/// lock is only held to read or swap the registry, never while an observer
/// runs.
pub(crate) struct SubjectCore<Item> {
  state: Mutex<SubjectState<Item>>,
  next_id: AtomicUsize,
}

impl<Item> SubjectCore<Item>
where
  Item: Clone + Send + 'static,
{
  pub(crate) fn new(replay: bool, value: Option<Item>) -> Arc<Self> {
    Arc::new(SubjectCore {
      state: Mutex::new(SubjectState {
        observers: Subscribers::default(),
        terminal: Terminal::Active,
        value,
        replay,
      }),
      next_id: AtomicUsize::new(0),
    })
  }

  pub(crate) fn subscribe<O>(self: &Arc<Self>, observer: O) -> Subscription
  where
    O: Observer<Item> + Send + 'static,
  {
    let boxed: BoxedObserver<'static, Item> = Box::new(observer);
    let entry: Entry<Item> = Arc::new(Mutex::new(Some(boxed)));
    // Hold the slot until the cached value is delivered, so a concurrent
    // `next` reaching this observer has to wait behind it.
    let mut slot = lock(&entry);
    let mut state = lock(&self.state);
    match state.terminal.clone() {
      Terminal::Failed(err) => {
        drop(state);
        let _delivering = self.enter_delivery();
        if let Some(observer) = slot.take() {
          observer.error(err);
        }
        return Subscription::cancelled();
      }
      Terminal::Completed => {
        let cached = state.value.clone();
        drop(state);
        let _delivering = self.enter_delivery();
        if let Some(mut observer) = slot.take() {
          if let Some(value) = cached {
            observer.next(value);
          }
          observer.complete();
        }
        return Subscription::cancelled();
      }
      Terminal::Active => {}
    }

    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    state.observers.add(id, entry.clone());
    let cached = state.value.clone();
    trace!(id, observers = state.observers.len(), "observer registered on subject");
    drop(state);

    if let (Some(value), Some(observer)) = (cached, slot.as_mut()) {
      let _delivering = self.enter_delivery();
      observer.next(value);
    }
    drop(slot);

    let registry: Weak<dyn Registry> = Arc::downgrade(self) as Weak<dyn Registry>;
    Subscription::registered(registry, id)
  }

  pub(crate) fn next(&self, value: Item) {
    self.assert_not_delivering();
    let snapshot = {
      let mut state = lock(&self.state);
      if !matches!(state.terminal, Terminal::Active) {
        return;
      }
      if state.replay {
        state.value = Some(value.clone());
      }
      state.observers.clone()
    };
    let _delivering = self.enter_delivery();
    snapshot.broadcast_value(value);
  }

  pub(crate) fn error(&self, err: RxError) {
    self.assert_not_delivering();
    let observers = {
      let mut state = lock(&self.state);
      if !matches!(state.terminal, Terminal::Active) {
        return;
      }
      state.terminal = Terminal::Failed(err.clone());
      state.observers.take_all()
    };
    debug!(error = %err, observers = observers.len(), "subject failed");
    let _delivering = self.enter_delivery();
    observers.broadcast_error(err);
  }

  pub(crate) fn complete(&self) {
    self.assert_not_delivering();
    let observers = {
      let mut state = lock(&self.state);
      if !matches!(state.terminal, Terminal::Active) {
        return;
      }
      state.terminal = Terminal::Completed;
      state.observers.take_all()
    };
    debug!(observers = observers.len(), "subject completed");
    let _delivering = self.enter_delivery();
    observers.broadcast_complete();
  }

  #[inline]
  fn address(&self) -> usize { self as *const Self as *const () as usize }

  fn enter_delivery(&self) -> DeliveryGuard { DeliveryGuard::enter(self.address()) }

  /// An observer emitting into the subject that is calling it would wait on
  /// its own slot forever.
  fn assert_not_delivering(&self) {
    let address = self.address();
    if DELIVERING.with(|d| d.borrow().contains(&address)) {
      panic!(
        "re-entrant Subject emissions are not supported (next/error/complete). Emit through a \
         scheduler (e.g. observe_on) if you need feedback loops."
      );
    }
  }

  pub(crate) fn observer_count(&self) -> usize { lock(&self.state).observers.len() }

  pub(crate) fn is_terminated(&self) -> bool {
    !matches!(lock(&self.state).terminal, Terminal::Active)
  }

  pub(crate) fn value(&self) -> Option<Item> { lock(&self.state).value.clone() }
}

impl<Item: Send + 'static> Registry for SubjectCore<Item> {
  fn unregister(&self, id: usize) {
    let mut state = lock(&self.state);
    if matches!(state.terminal, Terminal::Active) && state.observers.remove(id) {
      trace!(id, observers = state.observers.len(), "observer removed from subject");
    }
  }
}
