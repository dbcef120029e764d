//! Awaiting a [`Future`] from async code.
//!
//! A [`Settled`] registers a single observer the first time it is polled. The
//! observer parks the outcome in a slot shared with the task and wakes the
//! last waker it was polled with.
use crate::{Future, Outcome, Promise};
use std::{
    future::IntoFuture,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll, Waker},
};

/// Completes with the outcome of a [`Future`] once it settles.
///
/// # Examples
///
/// ```
/// use light_promise::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<u32>::new();
/// let producer = promise.clone();
/// let task = thread::spawn(move || producer.resolve(42));
///
/// assert_eq!(block_on(promise.settled()).unwrap(), 42);
/// task.join().expect("The task thread has panicked.");
/// ```
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Settled<V> {
    future: Future<V>,
    slot: Arc<Mutex<Slot<V>>>,
    observing: bool,
}

struct Slot<V> {
    outcome: Option<Outcome<V>>,
    waker: Option<Waker>,
}

impl<V> Future<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// A `std::future::Future` resolving to the outcome of this future.
    pub fn settled(&self) -> Settled<V> {
        Settled {
            future: self.clone(),
            slot: Arc::new(Mutex::new(Slot {
                outcome: None,
                waker: None,
            })),
            observing: false,
        }
    }
}

impl<V> std::future::Future for Settled<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = Outcome<V>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.observing {
            self.observing = true;
            let slot = self.slot.clone();
            self.future.observe(move |outcome| {
                let waker = {
                    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    slot.outcome = Some(outcome.clone());
                    slot.waker.take()
                };
                // Wake outside the lock.
                if let Some(waker) = waker {
                    waker.wake()
                }
            });
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<V> IntoFuture for Future<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = Outcome<V>;
    type IntoFuture = Settled<V>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}

impl<V> IntoFuture for Promise<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = Outcome<V>;
    type IntoFuture = Settled<V>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}
