//! # rxlite: push-based reactive streams
//!
//! A producer emits a sequence of values, then at most one terminal signal
//! (`error` or `complete`), to one or more observers. Operators between them
//! are composed lazily: nothing runs until `subscribe` is called.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! let mut out = vec![];
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe_next(|v| out.push(v));
//! assert_eq!(out, vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazily evaluated source, subscribed by an observer |
//! | [`ObservableExt`] | Operators: `map`, `filter`, `flat_map`, `subscribe_on`, `observe_on` |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`PublishSubject`] / [`BehaviorSubject`] | Hot sources multicasting to many observers |
//! | [`Scheduler`] | Where subscription or delivery work runs |
//!
//! ## Threads
//!
//! `subscribe_on` moves the subscription, and with it a cold producer, onto a
//! scheduler. `observe_on` moves delivery, keeping every observer's signals
//! in emission order even on a multi-threaded pool.
//!
//! ```rust
//! use std::{sync::mpsc, time::Duration};
//! use rxlite::prelude::*;
//!
//! let (tx, rx) = mpsc::channel();
//! observable::from_iter(1..=3)
//!   .subscribe_on(io().unwrap())
//!   .observe_on(single().unwrap())
//!   .subscribe_next(move |v| tx.send(v).unwrap());
//!
//! let got: Vec<_> = (0..3).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
//! assert_eq!(got, vec![1, 2, 3]);
//! ```
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`PublishSubject`]: subject::PublishSubject
//! [`BehaviorSubject`]: subject::BehaviorSubject
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscription;

pub use prelude::*;
