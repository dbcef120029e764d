use crate::{Error, Future, Promise};
use std::sync::{Arc, Mutex, PoisonError};

/// Values of a join that have arrived so far.
struct Pair<V, W> {
    left: Option<V>,
    right: Option<W>,
}

impl<V, W> Pair<V, W> {
    /// Takes both halves once both are present.
    fn complete(&mut self) -> Option<(V, W)> {
        match (&self.left, &self.right) {
            (Some(_), Some(_)) => self.left.take().zip(self.right.take()),
            _ => None,
        }
    }
}

impl<V> Future<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Chain a step that produces another future.
    ///
    /// Once `self` succeeds, `f` runs with its value and the returned future
    /// follows whatever `f` produced. If `self` fails, `f` never runs and the
    /// error is passed on unchanged. An error returned by `f` fails the
    /// returned future.
    ///
    /// ```
    /// use light_promise::{Future, Promise};
    ///
    /// let doubled = Promise::resolved(3).flat_map(|v| Ok(Future::resolved(v * 2)));
    /// assert_eq!(doubled.outcome().unwrap().unwrap(), 6);
    /// ```
    pub fn flat_map<W, F>(&self, f: F) -> Future<W>
    where
        W: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> Result<Future<W>, Error> + Send + 'static,
    {
        let promise = Promise::new();
        let future = promise.future();
        self.observe(move |outcome| match outcome {
            Ok(value) => match f(value.clone()) {
                Ok(next) => next.observe(move |outcome| {
                    let _ = match outcome {
                        Ok(value) => promise.resolve(value.clone()),
                        Err(err) => promise.reject(err.clone()),
                    };
                }),
                Err(err) => {
                    promise.reject(err);
                }
            },
            Err(err) => {
                promise.reject(err.clone());
            }
        });
        future
    }

    /// Map the value with a function that may fail.
    pub fn transformed<W, F>(&self, f: F) -> Future<W>
    where
        W: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> Result<W, Error> + Send + 'static,
    {
        self.flat_map(move |value| f(value).map(Future::resolved))
    }

    /// Join with `other` into a future of both values.
    ///
    /// The pair is available once both have succeeded, in whichever order they
    /// do. The first failure from either side fails the join right away
    /// without waiting for the other side.
    pub fn and<W>(&self, other: &Future<W>) -> Future<(V, W)>
    where
        W: Clone + Send + Sync + 'static,
    {
        let promise = Promise::new();
        let future = promise.future();
        let pair = Arc::new(Mutex::new(Pair {
            left: None,
            right: None,
        }));

        {
            let promise = promise.clone();
            let pair = pair.clone();
            self.observe(move |outcome| match outcome {
                Ok(value) => {
                    let both = {
                        let mut pair = pair.lock().unwrap_or_else(PoisonError::into_inner);
                        pair.left = Some(value.clone());
                        pair.complete()
                    };
                    if let Some(both) = both {
                        promise.resolve(both);
                    }
                }
                Err(err) => {
                    promise.reject(err.clone());
                }
            });
        }
        other.observe(move |outcome| match outcome {
            Ok(value) => {
                let both = {
                    let mut pair = pair.lock().unwrap_or_else(PoisonError::into_inner);
                    pair.right = Some(value.clone());
                    pair.complete()
                };
                if let Some(both) = both {
                    promise.resolve(both);
                }
            }
            Err(err) => {
                promise.reject(err.clone());
            }
        });
        future
    }
}
