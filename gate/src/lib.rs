//! Authenticated-session gate for the propdesk console.
//!
//! Decides, on every navigation, whether a visitor may reach protected
//! screens. The pieces, leaves first:
//!
//! - [`store`]: process-wide session state with subscribe/notify.
//! - [`verifier`]: de-duplicated, time-bounded identity check.
//! - [`guard`]: render / loading / redirect decisions per protected mount.
//! - [`redirect`]: preserves the requested destination across login.
//!
//! This crate is UI-framework independent and single-threaded (`Rc`), matching
//! the browser event loop. The `client` crate binds it to Leptos.

pub mod config;
pub mod error;
pub mod guard;
pub mod redirect;
pub mod store;
pub mod verifier;

use std::rc::Rc;

use futures::task::LocalSpawn;

pub use config::GateConfig;
pub use error::{ConfigError, SessionError};
pub use guard::{GuardDecision, NavigationGuard};
pub use redirect::RedirectTarget;
pub use store::{Identity, SessionState, SessionStatus, SessionStore, Subscription, UnauthenticatedReason};
pub use verifier::{CheckOutcome, IdentityCheck, SessionVerifier, Timer, VerifyHandle};

/// Owns the session store, its verifier, and the gate configuration.
///
/// Clones share the same session.
#[derive(Clone, Debug)]
pub struct SessionGate {
    config: Rc<GateConfig>,
    store: SessionStore,
    verifier: SessionVerifier,
}

impl SessionGate {
    /// `spawner` runs each verification to completion on the host's event loop.
    pub fn new(
        config: GateConfig,
        identity: Rc<dyn IdentityCheck>,
        timer: Rc<dyn Timer>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Self {
        let store = SessionStore::new();
        let verifier = SessionVerifier::new(store.clone(), identity, timer, spawner, config.verify_timeout);
        Self { config: Rc::new(config), store, verifier }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn verify(&self) -> VerifyHandle {
        self.verifier.verify()
    }

    /// A guard for one protected mount.
    #[must_use]
    pub fn guard(&self) -> NavigationGuard {
        NavigationGuard::new(Rc::clone(&self.config))
    }

    /// Login entry point preserving `target`.
    #[must_use]
    pub fn login_url(&self, target: &RedirectTarget) -> String {
        redirect::login_url(&self.config, target)
    }

    /// Forget the current session. The next protected navigation re-verifies.
    pub fn logout(&self) {
        tracing::info!("session reset by logout");
        self.store.reset();
    }

    /// Re-verify after a successful login submission and recover the preserved
    /// destination from the login page's query string.
    ///
    /// Any check started before the submission is abandoned, so a pre-login
    /// rejection cannot be mistaken for the login's outcome. An abandoned
    /// request is not cancelled: it may still be outstanding alongside the
    /// fresh one, and its result is discarded when it lands. Returns `None`
    /// when the fresh check does not authenticate.
    pub async fn complete_login(&self, search: &str) -> Option<RedirectTarget> {
        self.store.reset();
        let state = self.verifier.verify().await;
        if !state.is_authenticated() {
            tracing::warn!(status = %state.status(), "login submitted but session did not verify");
            return None;
        }
        Some(redirect::destination_from_search(search, &self.config))
    }
}
