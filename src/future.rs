use crate::{Error, Outcome};
use by_address::ByAddress;
use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, trace};

type Observer<V> = Box<dyn FnOnce(&Outcome<V>) + Send + 'static>;

/// State shared by a [`Promise`](crate::Promise) and every [`Future`] handle
/// cloned from it.
pub(crate) struct Shared<V> {
    inner: Mutex<Inner<V>>,
}

struct Inner<V> {
    outcome: Option<Arc<Outcome<V>>>,
    observers: Vec<Observer<V>>,
}

impl<V> Shared<V> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                outcome: None,
                observers: vec![],
            }),
        }
    }

    // Observers never run while the lock is held, so nothing can poison it.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observe(&self, observer: Observer<V>) {
        let outcome = {
            let mut inner = self.lock();
            match inner.outcome {
                Some(ref outcome) => outcome.clone(),
                None => {
                    inner.observers.push(observer);
                    return;
                }
            }
        };
        observer(&outcome);
    }

    /// Record the outcome and notify observers. Returns `false` without
    /// touching anything if an outcome was already recorded.
    pub(crate) fn settle(&self, outcome: Outcome<V>) -> bool {
        let (outcome, observers) = {
            let mut inner = self.lock();
            if inner.outcome.is_some() {
                debug!(
                    rejected = outcome.is_err(),
                    "ignoring settlement of an already settled future"
                );
                return false;
            }
            let outcome = Arc::new(outcome);
            inner.outcome = Some(outcome.clone());
            (outcome, mem::take(&mut inner.observers))
        };
        trace!(
            rejected = outcome.is_err(),
            observers = observers.len(),
            "future settled"
        );
        for observer in observers {
            observer(&outcome);
        }
        true
    }
}

/// A read-only handle to a value that will be available later, or to the
/// error that prevented it.
///
/// Handles are cheap to clone and all clones observe the same outcome.
/// Settling is only possible through the [`Promise`](crate::Promise) the
/// future was created from.
///
/// # Examples
///
/// ```
/// use light_promise::Promise;
/// use std::sync::{Arc, Mutex};
///
/// let promise = Promise::<u32>::new();
/// let seen = Arc::new(Mutex::new(None));
/// let sink = seen.clone();
/// promise.future().finally(move |value| *sink.lock().unwrap() = Some(*value));
///
/// promise.resolve(7);
/// assert_eq!(*seen.lock().unwrap(), Some(7));
/// ```
pub struct Future<V> {
    pub(crate) shared: ByAddress<Arc<Shared<V>>>,
}

impl<V> Future<V>
where
    V: Send + 'static,
{
    /// A future that has already succeeded with `value`.
    pub fn resolved(value: V) -> Self {
        let future = Self::pending();
        future.shared.settle(Ok(value));
        future
    }

    /// A future that has already failed with `err`.
    pub fn rejected(err: impl Into<Error>) -> Self {
        let future = Self::pending();
        future.shared.settle(Err(err.into()));
        future
    }

    pub(crate) fn pending() -> Self {
        Self {
            shared: ByAddress(Arc::new(Shared::new())),
        }
    }

    /// Register `callback` to run once with the outcome.
    ///
    /// If the future has already settled the callback runs right away, before
    /// `observe` returns. Otherwise it runs on the thread that settles the
    /// promise, after every callback registered before it.
    pub fn observe<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome<V>) + Send + 'static,
    {
        self.shared.observe(Box::new(callback))
    }

    /// Run `handler` with the error if the future fails.
    ///
    /// This only reacts to the failure. The future stays failed and so does
    /// anything derived from it.
    pub fn catch<F>(&self, handler: F)
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        self.observe(move |outcome| {
            if let Err(err) = outcome {
                handler(err)
            }
        })
    }

    /// Run `handler` with the value if the future succeeds.
    ///
    /// Returns the same future so further reactions can be chained onto it.
    pub fn finally<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(&V) + Send + 'static,
    {
        self.observe(move |outcome| {
            if let Ok(value) = outcome {
                handler(value)
            }
        });
        self
    }

    /// Alias of [`Future::finally`].
    #[inline]
    pub fn done<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(&V) + Send + 'static,
    {
        self.finally(handler)
    }

    /// Run `handler` once the future settles, whatever the outcome.
    pub fn always<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.observe(move |_| handler())
    }
}

impl<V> Future<V> {
    pub fn is_pending(&self) -> bool {
        self.shared.lock().outcome.is_none()
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// A snapshot of the outcome, if there is one yet. Never waits.
    pub fn outcome(&self) -> Option<Outcome<V>>
    where
        V: Clone,
    {
        self.shared
            .lock()
            .outcome
            .as_ref()
            .map(|outcome| (**outcome).clone())
    }
}

impl<V> Clone for Future<V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<V> Eq for Future<V> {}
impl<V> PartialEq for Future<V> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.shared.eq(&other.shared)
    }
}

impl<V> Hash for Future<V> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shared.hash(state)
    }
}

impl<V> fmt::Debug for Future<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.shared.lock().outcome.as_deref() {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "rejected",
        };
        f.debug_struct("Future")
            .field("id", &Arc::as_ptr(&self.shared.0))
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Future;
    use crate::{Error, Promise};
    use std::{
        collections::HashSet,
        sync::{Arc, Mutex},
    };

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(vec![]));
        (log.clone(), log)
    }

    #[test]
    fn test_observe_before_settlement() {
        let promise = Promise::<u32>::new();
        let (log, sink) = recorder();
        promise.observe(move |outcome| sink.lock().unwrap().push(format!("{:?}", outcome)));

        assert!(log.lock().unwrap().is_empty());
        promise.resolve(3);
        assert_eq!(*log.lock().unwrap(), vec!["Ok(3)"]);
    }

    #[test]
    fn test_observe_after_settlement_fires_before_returning() {
        let future = Future::resolved("berry");
        let (log, sink) = recorder();
        future.observe(move |outcome| sink.lock().unwrap().push(format!("{:?}", outcome)));
        assert_eq!(*log.lock().unwrap(), vec!["Ok(\"berry\")"]);
    }

    #[test]
    fn test_observers_fire_in_registration_order() {
        let promise = Promise::<()>::new();
        let (log, _) = recorder();
        for name in ["first", "second", "third"] {
            let sink = log.clone();
            promise.observe(move |_| sink.lock().unwrap().push(name.into()));
        }
        promise.resolve(());
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_observer_never_fires_while_pending() {
        let promise = Promise::<u32>::new();
        let (log, sink) = recorder();
        promise.always(move || sink.lock().unwrap().push("fired".into()));
        drop(promise);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_catch_only_sees_failures() {
        let (log, _) = recorder();

        let sink = log.clone();
        Future::resolved(1).catch(move |err| sink.lock().unwrap().push(err.to_string()));
        let sink = log.clone();
        Future::<u32>::rejected("reject!!").catch(move |err| sink.lock().unwrap().push(err.to_string()));

        assert_eq!(*log.lock().unwrap(), vec!["reject!!"]);
    }

    #[test]
    fn test_finally_only_sees_values_and_chains() {
        let promise = Promise::<u32>::new();
        let (log, _) = recorder();
        let first = log.clone();
        let second = log.clone();
        promise
            .finally(move |v| first.lock().unwrap().push(format!("finally {}", v)))
            .done(move |v| second.lock().unwrap().push(format!("done {}", v)));
        promise.resolve(10);
        assert_eq!(*log.lock().unwrap(), vec!["finally 10", "done 10"]);

        let sink = log.clone();
        Future::<u32>::rejected("nope").finally(move |_| sink.lock().unwrap().push("wrong".into()));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_always_fires_on_both_outcomes() {
        let (log, _) = recorder();
        let sink = log.clone();
        Future::resolved(()).always(move || sink.lock().unwrap().push("ok".into()));
        let sink = log.clone();
        Future::<()>::rejected(Error::msg("err")).always(move || sink.lock().unwrap().push("err".into()));
        assert_eq!(*log.lock().unwrap(), vec!["ok", "err"]);
    }

    #[test]
    fn test_identity_is_not_the_value() {
        let a = Future::resolved(1);
        let b = Future::resolved(1);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_promise_and_its_future_share_identity() {
        let promise = Promise::<u32>::new();
        assert_eq!(promise.future(), promise.future());
        assert_eq!(*promise, promise.future());
    }

    #[test]
    fn test_outcome_snapshot() {
        let promise = Promise::<u32>::new();
        assert!(promise.is_pending());
        assert!(promise.outcome().is_none());
        promise.resolve(4);
        assert!(promise.is_settled());
        assert_eq!(promise.outcome().unwrap().unwrap(), 4);
    }

    #[test]
    fn test_debug_shows_state() {
        let promise = Promise::<Vec<u8>>::new();
        assert!(format!("{:?}", promise.future()).contains("pending"));
        promise.reject(Error::msg("gone"));
        assert!(format!("{:?}", promise.future()).contains("rejected"));
    }
}
