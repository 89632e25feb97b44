use std::marker::PhantomData;

use tracing::debug;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::{Emitter, Observer},
  subscription::Subscription,
};

/// Creates a cold observable from a producer function.
///
/// The producer runs once per subscription, synchronously on the subscribing
/// thread unless `subscribe_on` moves it. Returning `Err` from the producer
/// delivers that cause as the stream's single error (unless a terminal signal
/// already went out) and the returned subscription is already cancelled.
///
/// ```
/// use rxlite::prelude::*;
///
/// let mut items = vec![];
/// observable::create(|emitter: &mut dyn Emitter<i32>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
///   Ok(())
/// })
/// .subscribe_next(|v| items.push(v));
/// assert_eq!(items, vec![1, 2]);
/// ```
pub fn create<Item, F>(producer: F) -> Create<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item>) -> Result<(), RxError>,
{
  Create { producer, _marker: PhantomData }
}

/// Observable created from a function.
///
/// This struct is created by [`create`].
pub struct Create<F, Item> {
  producer: F,
  _marker: PhantomData<fn() -> Item>,
}

impl<F: Clone, Item> Clone for Create<F, Item> {
  fn clone(&self) -> Self { Create { producer: self.producer.clone(), _marker: PhantomData } }
}

/// Guards the downstream observer against signals after a terminal one and
/// against emission once the subscription was cancelled.
struct CreateEmitter<O> {
  observer: Option<O>,
  subscription: Subscription,
}

impl<O, Item> Emitter<Item> for CreateEmitter<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_cancelled() {
      self.observer = None;
      return;
    }
    if let Some(observer) = &mut self.observer {
      observer.next(value);
      if observer.is_closed() {
        self.observer = None;
      }
    }
  }

  fn error(&mut self, err: RxError) {
    if let Some(observer) = self.observer.take() {
      if !self.subscription.is_cancelled() {
        observer.error(err);
      }
    }
  }

  fn complete(&mut self) {
    if let Some(observer) = self.observer.take() {
      if !self.subscription.is_cancelled() {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_cancelled() || self.observer.as_ref().is_none_or(|o| o.is_closed())
  }
}

impl<F, Item, O> Observable<Item, O> for Create<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item>) -> Result<(), RxError>,
  O: Observer<Item>,
{
  fn actual_subscribe(self, observer: O) -> Subscription {
    let subscription = Subscription::new();
    let mut emitter = CreateEmitter { observer: Some(observer), subscription: subscription.clone() };
    let result = {
      let dyn_emitter: &mut dyn Emitter<Item> = &mut emitter;
      (self.producer)(dyn_emitter)
    };
    if let Err(err) = result {
      debug!(error = %err, "producer failed during subscribe");
      Emitter::<Item>::error(&mut emitter, err);
      subscription.cancel();
    }
    subscription
  }
}

impl<F, Item> ObservableExt<Item> for Create<F, Item> {}
