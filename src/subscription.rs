use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, Weak,
  },
};

use smallvec::SmallVec;
use tracing::trace;

use crate::rc::lock;

/// An owner of observers that can drop one of them by id.
///
/// Subjects implement this so that the handle returned from `subscribe` can
/// remove its observer on cancel without keeping the subject alive.
pub(crate) trait Registry: Send + Sync {
  fn unregister(&self, id: usize);
}

enum Teardown {
  Unregister { registry: Weak<dyn Registry>, id: usize },
  Child(Subscription),
}

impl Teardown {
  fn is_done(&self) -> bool {
    match self {
      Teardown::Unregister { registry, .. } => registry.strong_count() == 0,
      Teardown::Child(child) => child.is_cancelled(),
    }
  }

  fn run(self) {
    match self {
      Teardown::Unregister { registry, id } => {
        if let Some(registry) = registry.upgrade() {
          registry.unregister(id);
        }
      }
      Teardown::Child(child) => child.cancel(),
    }
  }
}

struct Inner {
  cancelled: AtomicBool,
  teardown: Mutex<SmallVec<[Teardown; 1]>>,
}

/// Cancellation handle returned from `subscribe`.
///
/// Cloning shares the handle. `cancel` may be called any number of times from
/// any thread; the first call flips the flag, removes the observer from the
/// registry it was added to (if any) and cancels every attached child.
/// Cancellation is cooperative: it never interrupts a running producer or a
/// task already executing on a scheduler.
#[derive(Clone)]
pub struct Subscription(Arc<Inner>);

impl Subscription {
  /// A live subscription with nothing attached.
  pub fn new() -> Self {
    Subscription(Arc::new(Inner {
      cancelled: AtomicBool::new(false),
      teardown: Mutex::new(SmallVec::new()),
    }))
  }

  /// A subscription that is already cancelled, returned when subscribing to
  /// something that has already terminated.
  pub fn cancelled() -> Self {
    let subscription = Subscription::new();
    subscription.0.cancelled.store(true, Ordering::Release);
    subscription
  }

  /// A live subscription that removes observer `id` from `registry` when
  /// cancelled.
  pub(crate) fn registered(registry: Weak<dyn Registry>, id: usize) -> Self {
    let subscription = Subscription::new();
    lock(&subscription.0.teardown).push(Teardown::Unregister { registry, id });
    subscription
  }

  pub fn cancel(&self) {
    if self.0.cancelled.swap(true, Ordering::AcqRel) {
      return;
    }
    trace!(teardown = self.teardown_size(), "subscription cancelled");
    let teardown = std::mem::take(&mut *lock(&self.0.teardown));
    for t in teardown {
      t.run();
    }
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  /// Attaches `child` so that it is cancelled together with `self`.
  ///
  /// Adding to an already cancelled subscription cancels `child` at once.
  pub fn add(&self, child: Subscription) {
    if self.is_same(&child) {
      return;
    }
    {
      let mut teardown = lock(&self.0.teardown);
      if !self.is_cancelled() {
        teardown.retain(|t| !t.is_done());
        teardown.push(Teardown::Child(child));
        return;
      }
    }
    child.cancel();
  }

  /// Activates "RAII" behavior for this subscription: the returned guard
  /// cancels it as soon as it goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `cancel()` is called immediately, which is probably not what you want!
  pub fn cancel_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(Some(self)) }

  pub(crate) fn teardown_size(&self) -> usize { lock(&self.0.teardown).len() }

  fn is_same(&self, other: &Subscription) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl Default for Subscription {
  fn default() -> Self { Subscription::new() }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("cancelled", &self.is_cancelled())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be cancelled.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard {
    SubscriptionGuard(Some(subscription))
  }

  /// Releases the subscription without cancelling it.
  pub fn into_inner(mut self) -> Subscription { self.0.take().unwrap_or_default() }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.cancel();
    }
  }
}
