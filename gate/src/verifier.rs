//! Bridge between the session store and the remote identity check.
//!
//! SYSTEM CONTEXT
//! ==============
//! Many mount points may ask for verification at once (nested protected
//! layouts on first load). They all receive the same shared future, keyed by
//! the store's verification epoch, so at most one identity request is ever in
//! flight.
//!
//! Each request is also handed to the host's executor through a
//! `LocalSpawn`, so it runs to its timeout even after every caller has
//! dropped its handle.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and backend silence never escape as errors: they
//! resolve the store to `Unauthenticated` with `verification_failed` or
//! `timeout`. The store is never left in `Checking` once a request settles.

#[cfg(test)]
#[path = "verifier_test.rs"]
mod verifier_test;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, Either, FutureExt, LocalBoxFuture, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::store::{Identity, SessionState, SessionStatus, SessionStore, UnauthenticatedReason};

/// Result of one call to the identity-check endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// 200-class response carrying an identity payload.
    Authenticated(Identity),
    /// 401/403-class response.
    Rejected,
    /// Transport error, unexpected status, or malformed payload.
    Failed(String),
}

/// Performs the identity check over whatever transport the host provides.
#[async_trait(?Send)]
pub trait IdentityCheck {
    async fn check(&self) -> CheckOutcome;
}

/// Suspends for a duration on the host's event loop.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Shared completion of one verification; yields the resulting session state.
pub type VerifyHandle = Shared<LocalBoxFuture<'static, SessionState>>;

struct InFlight {
    epoch: u64,
    handle: VerifyHandle,
}

/// Issues identity checks and reports their outcome to a [`SessionStore`].
#[derive(Clone)]
pub struct SessionVerifier {
    store: SessionStore,
    identity: Rc<dyn IdentityCheck>,
    timer: Rc<dyn Timer>,
    spawner: Rc<dyn LocalSpawn>,
    timeout: Duration,
    in_flight: Rc<RefCell<Option<InFlight>>>,
    requests_issued: Rc<Cell<u64>>,
}

impl fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("timeout", &self.timeout)
            .field("in_flight", &self.in_flight.borrow().as_ref().map(|flight| flight.epoch))
            .field("requests_issued", &self.requests_issued.get())
            .finish_non_exhaustive()
    }
}

impl SessionVerifier {
    pub fn new(
        store: SessionStore,
        identity: Rc<dyn IdentityCheck>,
        timer: Rc<dyn Timer>,
        spawner: Rc<dyn LocalSpawn>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            identity,
            timer,
            spawner,
            timeout,
            in_flight: Rc::new(RefCell::new(None)),
            requests_issued: Rc::new(Cell::new(0)),
        }
    }

    /// Verify the session, joining the in-flight request when there is one.
    ///
    /// A new request is spawned on the host executor, so dropping the returned
    /// handle only drops the caller's interest. The request still settles,
    /// by timeout at the latest.
    pub fn verify(&self) -> VerifyHandle {
        if let Some(handle) = self.current_in_flight() {
            return handle;
        }

        self.store.begin_check();
        let epoch = self.store.epoch();
        self.requests_issued.set(self.requests_issued.get() + 1);
        tracing::info!(epoch, "session verification started");

        let handle = run_check(
            self.store.clone(),
            Rc::clone(&self.identity),
            Rc::clone(&self.timer),
            self.timeout,
            epoch,
            Rc::clone(&self.in_flight),
        )
        .boxed_local()
        .shared();
        *self.in_flight.borrow_mut() = Some(InFlight { epoch, handle: handle.clone() });
        if let Err(err) = self.spawner.spawn_local(handle.clone().map(drop)) {
            tracing::error!(epoch, %err, "could not spawn session verification; callers must poll it");
        }
        handle
    }

    /// Number of identity requests issued over this verifier's lifetime.
    #[must_use]
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.get()
    }

    /// Whether a request for the current epoch is still pending.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.current_in_flight().is_some()
    }

    fn current_in_flight(&self) -> Option<VerifyHandle> {
        let slot = self.in_flight.borrow();
        let flight = slot.as_ref()?;
        let current = self.store.status() == SessionStatus::Checking && flight.epoch == self.store.epoch();
        current.then(|| flight.handle.clone())
    }
}

async fn run_check(
    store: SessionStore,
    identity: Rc<dyn IdentityCheck>,
    timer: Rc<dyn Timer>,
    timeout: Duration,
    epoch: u64,
    in_flight: Rc<RefCell<Option<InFlight>>>,
) -> SessionState {
    let outcome = match future::select(identity.check(), timer.sleep(timeout)).await {
        Either::Left((outcome, _)) => settle(outcome),
        Either::Right(((), _)) => {
            tracing::warn!(epoch, ?timeout, "session verification timed out");
            Err(UnauthenticatedReason::Timeout)
        }
    };

    {
        let mut slot = in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|f| f.epoch == epoch) {
            *slot = None;
        }
    }

    if store.epoch() != epoch || store.status() != SessionStatus::Checking {
        tracing::debug!(epoch, current = store.epoch(), "discarding stale verification result");
        return store.state();
    }

    let applied = match outcome {
        Ok(user) => {
            tracing::info!(epoch, user_id = %user.id, "session verified");
            store.resolve_authenticated(user)
        }
        Err(reason) => {
            tracing::info!(epoch, %reason, "session not authenticated");
            store.resolve_unauthenticated(reason)
        }
    };
    if let Err(err) = applied {
        tracing::error!(%err, "verification outcome rejected by store");
    }
    store.state()
}

fn settle(outcome: CheckOutcome) -> Result<Identity, UnauthenticatedReason> {
    match outcome {
        CheckOutcome::Authenticated(user) => Ok(user),
        CheckOutcome::Rejected => Err(UnauthenticatedReason::Rejected),
        CheckOutcome::Failed(detail) => {
            tracing::warn!(%detail, "identity check failed");
            Err(UnauthenticatedReason::VerificationFailed)
        }
    }
}
