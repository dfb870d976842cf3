//! Session context binding the `gate` crate to Leptos reactivity.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by `ProtectedLayout`, the login page, and user-aware components. The
//! gate's store stays the single writer; a store subscription mirrors every
//! transition into an `RwSignal` so views re-render synchronously with it.
//!
//! TRADE-OFFS
//! ==========
//! The gate is `Rc`-based (browser event loop), so it lives in a
//! `LocalStorage` stored value. Only the mirrored snapshot is a thread-safe
//! signal, which keeps SSR rendering free of gate access.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use gate::{GateConfig, NavigationGuard, SessionGate, SessionState, Subscription};
use leptos::prelude::*;

use crate::net::api::HttpIdentityCheck;
use crate::util::spawn::BrowserSpawner;
use crate::util::timer::BrowserTimer;

/// Gate configuration for this build.
///
/// `PROPDESK_VERIFY_TIMEOUT_SECS` may override the verification bound at
/// compile time.
pub fn gate_config() -> GateConfig {
    gate_config_from(option_env!("PROPDESK_VERIFY_TIMEOUT_SECS"))
}

fn gate_config_from(raw_timeout: Option<&str>) -> GateConfig {
    let config = GateConfig::default().with_timeout_secs_str(raw_timeout);
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            leptos::logging::warn!("invalid gate config ({e}); using defaults");
            GateConfig::default()
        }
    }
}

struct SessionRuntime {
    gate: SessionGate,
    _mirror: Subscription,
}

/// Session handle provided via context; cheap to copy into closures.
#[derive(Clone, Copy)]
pub struct SessionContext {
    /// Latest session snapshot; read this in views and effects.
    pub state: RwSignal<SessionState>,
    runtime: StoredValue<SessionRuntime, LocalStorage>,
}

impl SessionContext {
    pub fn new(config: GateConfig) -> Self {
        let identity = HttpIdentityCheck::new(config.identity_endpoint.clone());
        let gate = SessionGate::new(config, Rc::new(identity), Rc::new(BrowserTimer), Rc::new(BrowserSpawner));
        let state = RwSignal::new(gate.state());
        let mirror = gate.subscribe(move |snapshot| {
            let _ = state.try_set(snapshot.clone());
        });
        let runtime = StoredValue::new_local(SessionRuntime { gate, _mirror: mirror });
        Self { state, runtime }
    }

    /// A clone of the underlying gate (shares the same session).
    pub fn gate(&self) -> SessionGate {
        self.runtime.with_value(|rt| rt.gate.clone())
    }

    /// A guard for one protected mount.
    pub fn guard(&self) -> NavigationGuard {
        self.runtime.with_value(|rt| rt.gate.guard())
    }

    pub fn login_path(&self) -> String {
        self.runtime.with_value(|rt| rt.gate.config().login_path.clone())
    }

    /// Start (or join) verification; the gate drives it on the local executor.
    pub fn verify(&self) {
        let handle = self.runtime.with_value(|rt| rt.gate.verify());
        drop(handle);
    }

    /// Forget the session; the next protected navigation re-verifies.
    pub fn logout(&self) {
        self.runtime.with_value(|rt| rt.gate.logout());
    }
}

/// The session context provided by `App`.
///
/// # Panics
///
/// Panics when called outside the `App` component tree.
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}
