// SPDX-License-Identifier: GPL-3.0-only

//! Cancelable, deadline-bearing request contexts
//!
//! Every driver operation that performs backend I/O takes a
//! [`RequestContext`]. Drivers check it before touching backend state and
//! race long waits against it, so cancellation surfaces as a
//! `Canceled`/`DeadlineExceeded` failure instead of a backend error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{DriverError, DriverErrorKind};

/// Cancellation and deadline scope for a single driver call.
///
/// Cloning shares the underlying token: canceling any clone cancels the
/// whole request. Contexts are passed explicitly through every
/// I/O-performing call, never kept as ambient state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context with no deadline that is canceled only explicitly
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires at the given instant
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context that expires after the given duration
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the request; all clones observe the cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail fast if the request has already ended.
    ///
    /// Drivers call this before any backend side effect so an expired
    /// context never reaches the backend.
    pub fn ensure_active(&self) -> Result<(), DriverError> {
        if self.cancel.is_cancelled() {
            return Err(DriverError::new(
                DriverErrorKind::Canceled,
                "request canceled",
            ));
        }
        if self.deadline_exceeded() {
            return Err(DriverError::new(
                DriverErrorKind::DeadlineExceeded,
                "request deadline exceeded",
            ));
        }
        Ok(())
    }

    /// Run a driver future, aborting it when the context ends first.
    ///
    /// The returned failure is `Canceled` or `DeadlineExceeded`, never a
    /// backend-specific error, so callers can distinguish their own
    /// cancellation from backend trouble.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, DriverError>
    where
        F: Future<Output = Result<T, DriverError>>,
    {
        self.ensure_active()?;

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = operation => result,
            _ = self.cancel.cancelled() => Err(DriverError::new(
                DriverErrorKind::Canceled,
                "request canceled",
            )),
            _ = deadline => Err(DriverError::new(
                DriverErrorKind::DeadlineExceeded,
                "request deadline exceeded",
            )),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
