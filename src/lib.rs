//! Callback based futures and promises.
//!
//! A [`Promise`] is settled once, with a value or an [`Error`], by whoever
//! produces the result. Consumers hold a read-only [`Future`] and either
//! [`observe`](Future::observe) it or derive new futures from it with
//! [`flat_map`](Future::flat_map), [`transformed`](Future::transformed) and
//! [`and`](Future::and). Reactions run synchronously on the thread that
//! settles the promise, or right away if it has already settled; nothing is
//! queued and nothing blocks.
//!
//! ```
//! use light_promise::{Future, Promise};
//! use std::sync::{Arc, Mutex};
//!
//! let width = Promise::<u32>::new();
//! let height = Promise::<u32>::new();
//! let area = width
//!     .and(&height)
//!     .flat_map(|(w, h)| Ok(Future::resolved(w * h)));
//!
//! let seen = Arc::new(Mutex::new(None));
//! let sink = seen.clone();
//! area.finally(move |area| *sink.lock().unwrap() = Some(*area));
//!
//! height.resolve(3);
//! width.resolve(4);
//! assert_eq!(*seen.lock().unwrap(), Some(12));
//! ```
//!
//! Futures can also be awaited; see [`Settled`].
mod combinators;
mod error;
mod future;
mod promise;
mod settled;

pub use {error::Error, future::Future, promise::Promise, settled::Settled};

/// What a [`Future`] settles to.
pub type Outcome<V> = Result<V, Error>;
