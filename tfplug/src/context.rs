//! Context implementation for request-scoped data and cancellation
//!
//! This module provides the Context type which carries request-scoped values
//! like cancellation signals, deadlines, and metadata across async boundaries.

use crate::error::{Result, TfplugError};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};

/// Context carries request-scoped values like cancellation signals, deadlines and metadata.
/// Pass it as the first parameter to every async trait method.
///
/// Clones share cancellation and values; `with_timeout` narrows the deadline
/// of the returned copy only.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
    deadline: Option<Deadline>,
}

#[derive(Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

struct ContextInner {
    values: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                done_tx,
            }),
            deadline: None,
        }
    }

    /// Returns a context whose deadline is `timeout` from now, or the
    /// existing deadline if that one is earlier.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let candidate = Deadline {
            at: Instant::now() + timeout,
            budget: timeout,
        };
        let deadline = match self.deadline {
            Some(existing) if existing.at <= candidate.at => existing,
            _ => candidate,
        };

        Self {
            inner: self.inner,
            deadline: Some(deadline),
        }
    }

    pub async fn with_value<T: Send + Sync + 'static>(self, key: &str, value: T) -> Self {
        let mut values = self.inner.values.write().await;
        values.insert(key.to_string(), Box::new(value));
        drop(values);
        self
    }

    pub async fn get_value<T>(&self, key: &str) -> Option<T>
    where
        T: Send + Sync + Clone + 'static,
    {
        let values = self.inner.values.read().await;
        values.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow() || self.is_expired()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.map(|d| d.at)
    }

    /// Returns a channel that flips to `true` when the caller cancels
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Drives `future` to completion unless the deadline passes or the
    /// context is cancelled first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output>
    where
        F: Future,
    {
        if *self.inner.done.borrow() {
            return Err(TfplugError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if self.is_expired() {
                return Err(TfplugError::DeadlineExceeded(deadline.budget));
            }
        }

        let mut done = self.done();
        let cancelled = async move {
            while done.changed().await.is_ok() {
                if *done.borrow() {
                    return;
                }
            }
            std::future::pending::<()>().await
        };

        match self.deadline {
            Some(deadline) => {
                let at = tokio::time::Instant::from_std(deadline.at);
                tokio::select! {
                    output = tokio::time::timeout_at(at, future) => {
                        output.map_err(|_| TfplugError::DeadlineExceeded(deadline.budget))
                    }
                    _ = cancelled => Err(TfplugError::Cancelled),
                }
            }
            None => tokio::select! {
                output = future => Ok(output),
                _ = cancelled => Err(TfplugError::Cancelled),
            },
        }
    }

    fn is_expired(&self) -> bool {
        self.deadline
            .map(|d| Instant::now() >= d.at)
            .unwrap_or(false)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
