//! Process-wide authentication state with a subscribe/notify contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` exists per running console. Every UI mount point reads
//! it; only the verifier outcome and explicit logout write it. All mutation
//! funnels through `begin_check`, `resolve_authenticated`,
//! `resolve_unauthenticated`, and `reset`.
//!
//! DESIGN
//! ======
//! Handles are cheap `Rc` clones over one registry. Subscribers are invoked
//! synchronously after the mutation completes and after the registry borrow
//! is released, so a subscriber sees a consistent snapshot and may call back
//! into the store.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Lifecycle of the current visitor's session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Nothing has been checked yet (startup, or after logout).
    #[default]
    Unknown,
    /// An identity check is in flight.
    Checking,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the last verification ended unauthenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnauthenticatedReason {
    /// Backend answered with a 401/403-class response.
    Rejected,
    /// Transport error or malformed response.
    VerificationFailed,
    /// Backend stayed silent past the verification bound.
    Timeout,
}

impl UnauthenticatedReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rejected => "unauthenticated",
            Self::VerificationFailed => "verification_failed",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity payload returned by the identity-check endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Immutable snapshot of the session.
///
/// `user` is present iff `status` is `Authenticated`; the store's transitions
/// are the only way to build a non-default value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    status: SessionStatus,
    user: Option<Identity>,
    last_error: Option<UnauthenticatedReason>,
    epoch: u64,
}

impl SessionState {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True while the outcome is not yet known (`Unknown` or `Checking`).
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, SessionStatus::Unknown | SessionStatus::Checking)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<UnauthenticatedReason> {
        self.last_error
    }

    /// Verification epoch; bumped by every new check and every reset.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

type Listener = Rc<dyn Fn(&SessionState)>;

#[derive(Default)]
struct Registry {
    state: SessionState,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
}

/// Shared handle to the session state.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Rc<RefCell<Registry>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("SessionStore")
            .field("state", &registry.state)
            .field("listeners", &registry.listeners.len())
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.borrow().state.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.borrow().state.status
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.borrow().state.epoch
    }

    /// Register a listener called with the new snapshot after every transition.
    ///
    /// The listener stays registered until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_listener;
        registry.next_listener += 1;
        registry.listeners.push((id, Rc::new(listener)));
        Subscription { id, registry: Rc::downgrade(&self.inner) }
    }

    /// Enter `Checking` and clear `last_error`.
    ///
    /// Returns `false` without notifying when a check is already in flight.
    pub fn begin_check(&self) -> bool {
        if self.status() == SessionStatus::Checking {
            return false;
        }
        self.transition(|state| {
            state.status = SessionStatus::Checking;
            state.user = None;
            state.last_error = None;
            state.epoch += 1;
        });
        true
    }

    /// Complete the in-flight check with an identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the status is `Checking`.
    pub fn resolve_authenticated(&self, user: Identity) -> Result<(), SessionError> {
        self.require_checking("resolve_authenticated")?;
        self.transition(|state| {
            state.status = SessionStatus::Authenticated;
            state.user = Some(user);
        });
        Ok(())
    }

    /// Complete the in-flight check without an identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the status is `Checking`.
    pub fn resolve_unauthenticated(&self, reason: UnauthenticatedReason) -> Result<(), SessionError> {
        self.require_checking("resolve_unauthenticated")?;
        self.transition(|state| {
            state.status = SessionStatus::Unauthenticated;
            state.user = None;
            state.last_error = Some(reason);
        });
        Ok(())
    }

    /// Force `Unknown` and drop identity and error (logout).
    pub fn reset(&self) {
        self.transition(|state| {
            state.status = SessionStatus::Unknown;
            state.user = None;
            state.last_error = None;
            state.epoch += 1;
        });
    }

    fn require_checking(&self, operation: &'static str) -> Result<(), SessionError> {
        let from = self.status();
        if from == SessionStatus::Checking {
            return Ok(());
        }
        tracing::error!(%from, operation, "session store misuse: resolve outside of a check");
        Err(SessionError::InvalidTransition { from, operation })
    }

    fn transition(&self, mutate: impl FnOnce(&mut SessionState)) {
        let listeners: Vec<Listener> = {
            let mut registry = self.inner.borrow_mut();
            mutate(&mut registry.state);
            registry.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        // Each listener gets the latest state; an earlier listener may have
        // transitioned again.
        for listener in listeners {
            let snapshot = self.state();
            listener(&snapshot);
        }
    }
}

/// Keeps a store listener registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
