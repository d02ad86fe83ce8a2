// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped deduplication of identity lookups.
//!
//! A [`RequestGroup`] coalesces concurrent calls that share a key: the first
//! caller starts the lookup and every caller that arrives while it is in
//! flight receives the same outcome. Nothing is cached; once a call
//! completes the next caller with that key starts a new one.
//!
//! The lookup runs on its own tokio task, so dropping a waiting future (for
//! example when a client disconnects) never cancels the shared call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

/// Outcome shared by every waiter of a call.
type Outcome<T, E> = Option<Result<T, E>>;

/// Errors returned to callers of [`RequestGroup::run`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError<E> {
    /// The lookup itself failed
    #[error("{0}")]
    Failed(E),

    /// The lookup ended without producing a result (it panicked)
    #[error("lookup abandoned before completing")]
    Abandoned,
}

struct Call<T, E> {
    id: u64,
    rx: watch::Receiver<Outcome<T, E>>,
}

type Calls<T, E> = Arc<Mutex<HashMap<String, Call<T, E>>>>;

/// Coalesces concurrent lookups by key.
pub struct RequestGroup<T, E> {
    calls: Calls<T, E>,
    next_id: Arc<AtomicU64>,
}

impl<T, E> Clone for RequestGroup<T, E> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T, E> Default for RequestGroup<T, E> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T, E> RequestGroup<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `lookup` for `key`, or join the call already in flight for it.
    ///
    /// `lookup` is only invoked when this caller starts the call.
    pub async fn run<F, Fut>(&self, key: impl Into<String>, lookup: F) -> Result<T, GroupError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let key = key.into();

        let mut rx = {
            let mut calls = lock(&self.calls);
            if let Some(call) = calls.get(&key) {
                call.rx.clone()
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(None);
                calls.insert(
                    key.clone(),
                    Call {
                        id,
                        rx: rx.clone(),
                    },
                );
                drop(calls);

                // Removes the entry on completion, and on unwind if the
                // lookup panics.
                let cleanup = Cleanup {
                    calls: Arc::clone(&self.calls),
                    key,
                    id,
                };
                let fut = lookup();
                tokio::spawn(async move {
                    let result = fut.await;
                    drop(cleanup);
                    // Fails only when every waiter has gone away.
                    let _ = tx.send(Some(result));
                });
                rx
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| GroupError::Abandoned)?;

        match outcome.as_ref() {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(err)) => Err(GroupError::Failed(err.clone())),
            None => Err(GroupError::Abandoned),
        }
    }

    /// Detach the in-flight call for `key`, if any.
    ///
    /// The detached call still completes for its current waiters; later
    /// callers start a new call.
    pub fn forget(&self, key: &str) {
        lock(&self.calls).remove(key);
    }

    /// Number of keys with a call in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.calls).len()
    }
}

/// Key for a resource lookup, e.g. `user_id:<uuid>`.
pub fn resource_key(kind: &str, id: impl std::fmt::Display) -> String {
    format!("{kind}:{id}")
}

fn lock<T, E>(calls: &Mutex<HashMap<String, Call<T, E>>>) -> MutexGuard<'_, HashMap<String, Call<T, E>>> {
    calls.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Cleanup<T, E> {
    calls: Calls<T, E>,
    key: String,
    id: u64,
}

impl<T, E> Drop for Cleanup<T, E> {
    fn drop(&mut self) {
        let mut calls = lock(&self.calls);
        // A forgotten key may already belong to a newer call.
        if calls.get(&self.key).is_some_and(|call| call.id == self.id) {
            calls.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LookupError;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;
    use tokio::time::sleep;

    type Group = RequestGroup<u32, LookupError>;

    async fn counted(counter: Arc<AtomicUsize>, value: u32) -> Result<u32, LookupError> {
        counter.fetch_add(1, Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;
        Ok(value)
    }

    async fn exploding() -> Result<u32, LookupError> {
        sleep(Duration::from_millis(10)).await;
        panic!("lookup exploded")
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_lookup() {
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let group = group.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                group.run("user_id:1", move || counted(counter, 7)).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn failure_is_shared_by_all_waiters() {
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let lookup = |counter: Arc<AtomicUsize>| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(50)).await;
            Err::<u32, _>(LookupError::Store("down".into()))
        };

        let (a, b, c) = tokio::join!(
            group.run("k", {
                let counter = counter.clone();
                move || lookup(counter)
            }),
            group.run("k", {
                let counter = counter.clone();
                move || lookup(counter)
            }),
            group.run("k", {
                let counter = counter.clone();
                move || lookup(counter)
            }),
        );

        let expected = Err(GroupError::Failed(LookupError::Store("down".into())));
        assert_eq!(a, expected);
        assert_eq!(b, expected);
        assert_eq!(c, expected);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            group.run(resource_key("user_id", 1), {
                let counter = counter.clone();
                move || counted(counter, 1)
            }),
            group.run(resource_key("user_id", 2), {
                let counter = counter.clone();
                move || counted(counter, 2)
            }),
        );

        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn completed_calls_are_not_cached() {
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        assert_eq!(group.run("k", move || counted(c, 1)).await, Ok(1));
        let c = counter.clone();
        assert_eq!(group.run("k", move || counted(c, 2)).await, Ok(2));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn dropped_waiter_does_not_cancel_lookup() {
        let group = Group::new();
        let finished = Arc::new(AtomicBool::new(false));

        let done = finished.clone();
        let waiter = tokio::time::timeout(
            Duration::from_millis(10),
            group.run("k", move || async move {
                sleep(Duration::from_millis(50)).await;
                done.store(true, Ordering::SeqCst);
                Ok(1)
            }),
        )
        .await;
        assert!(waiter.is_err());
        assert_eq!(group.in_flight(), 1);

        sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn panicking_lookup_is_abandoned() {
        let group = Group::new();

        let result = group.run("k", exploding).await;
        assert_eq!(result, Err(GroupError::Abandoned));
        assert_eq!(group.in_flight(), 0);

        let counter = Arc::new(AtomicUsize::new(0));
        assert_eq!(group.run("k", move || counted(counter, 3)).await, Ok(3));
    }

    #[tokio::test]
    async fn forget_starts_fresh_call() {
        let group = Group::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = {
            let counter = counter.clone();
            group.run("k", move || counted(counter, 1))
        };
        let second = async {
            sleep(Duration::from_millis(10)).await;
            group.forget("k");
            let counter = counter.clone();
            group.run("k", move || counted(counter, 2)).await
        };

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(group.in_flight(), 0);
    }

    #[test]
    fn resource_key_format() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            resource_key("user_id", id),
            "user_id:00000000-0000-0000-0000-000000000000"
        );
    }
}
