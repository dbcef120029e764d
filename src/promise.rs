use crate::{future::Future, Error};
use std::ops::Deref;

/// The writable side of a [`Future`].
///
/// A promise settles exactly once, to a value with [`Promise::resolve`] or to
/// an error with [`Promise::reject`]. Every later attempt is ignored. It
/// dereferences to its future, so everything a future offers is available on
/// the promise as well; hand out [`Promise::future`] to consumers that must not
/// settle it.
///
/// # Examples
///
/// ```
/// use light_promise::Promise;
/// use std::thread;
///
/// let mut worker = None;
/// let promise = Promise::<String>::with_setup(|promise| {
///     worker = Some(thread::spawn(move || {
///         promise.resolve("Hi".into());
///     }));
/// });
///
/// let greeting = promise.transformed(|text| Ok(text.len()));
/// worker.unwrap().join().expect("The worker thread has panicked.");
/// assert_eq!(greeting.outcome().unwrap().unwrap(), 2);
/// ```
pub struct Promise<V> {
    future: Future<V>,
}

impl<V> Promise<V>
where
    V: Send + 'static,
{
    /// A pending promise.
    pub fn new() -> Self {
        Self {
            future: Future::pending(),
        }
    }

    /// A promise that is already resolved with `value`.
    pub fn resolved(value: V) -> Self {
        let promise = Self::new();
        promise.resolve(value);
        promise
    }

    /// A pending promise, handed to `setup` before it is returned.
    ///
    /// `setup` runs right away on the calling thread. It typically moves its
    /// handle into whatever completes the work later.
    pub fn with_setup<F>(setup: F) -> Self
    where
        F: FnOnce(Promise<V>),
    {
        let promise = Self::new();
        setup(promise.clone());
        promise
    }

    /// Settle with `value`.
    ///
    /// Returns `false`, and changes nothing, if the promise has already
    /// settled.
    pub fn resolve(&self, value: V) -> bool {
        self.future.shared.settle(Ok(value))
    }

    /// Settle with `err`.
    ///
    /// Returns `false`, and changes nothing, if the promise has already
    /// settled.
    pub fn reject(&self, err: impl Into<Error>) -> bool {
        self.future.shared.settle(Err(err.into()))
    }
}

impl<V> Promise<V> {
    /// A read-only handle to the same outcome.
    #[inline]
    pub fn future(&self) -> Future<V> {
        self.future.clone()
    }
}

impl<V> Default for Promise<V>
where
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Promise<V> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<V> Deref for Promise<V> {
    type Target = Future<V>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.future
    }
}

impl<V> From<Promise<V>> for Future<V> {
    fn from(promise: Promise<V>) -> Self {
        promise.future
    }
}

impl<V> std::fmt::Debug for Promise<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Promise").field(&self.future).finish()
    }
}
