//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::{RxError, SchedulerError},
  observable::{self, Observable, ObservableExt},
  observer::{BoxedObserver, DynObserver, Emitter, FnMutObserver, Observer, ObserverAll, RxValue},
  scheduler::{
    computation, io, single, ComputationScheduler, ImmediateScheduler, IoScheduler,
    ManualScheduler, Scheduler, SchedulerConfig, SingleThreadScheduler,
  },
  subject::{BehaviorSubject, PublishSubject, SubjectObserver},
  subscription::{Subscription, SubscriptionGuard},
};
