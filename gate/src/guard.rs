//! Render-vs-redirect decisions for a protected region of the navigation tree.
//!
//! SYSTEM CONTEXT
//! ==============
//! A `NavigationGuard` lives for one mount of a protected layout. The UI layer
//! feeds it the current session snapshot and location on every session change
//! and every route change, and acts on the returned [`GuardDecision`].
//!
//! DESIGN
//! ======
//! Re-evaluation is idempotent: a redirect is issued once per distinct
//! unauthenticated resolution (verification epoch) and target, no matter how
//! many times the layout re-renders.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::GateConfig;
use crate::redirect::{self, RedirectTarget};
use crate::store::{SessionState, SessionStatus};

/// What a protected layout should do for the current snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Outcome unknown: show a loading placeholder and nothing else.
    Loading,
    /// Authenticated: show the protected subtree.
    Render,
    /// Replace the current history entry with this login URL.
    Redirect(String),
    /// Redirect already issued for this resolution: render nothing.
    Blocked,
}

#[derive(Debug)]
pub struct NavigationGuard {
    config: Rc<GateConfig>,
    issued: RefCell<Option<(u64, RedirectTarget)>>,
}

impl NavigationGuard {
    pub fn new(config: Rc<GateConfig>) -> Self {
        Self { config, issued: RefCell::new(None) }
    }

    /// Whether this snapshot calls for a verification (nothing checked yet).
    #[must_use]
    pub fn should_verify(&self, state: &SessionState) -> bool {
        state.status() == SessionStatus::Unknown
    }

    pub fn evaluate(&self, state: &SessionState, target: &RedirectTarget) -> GuardDecision {
        match state.status() {
            SessionStatus::Unknown | SessionStatus::Checking => GuardDecision::Loading,
            SessionStatus::Authenticated => GuardDecision::Render,
            SessionStatus::Unauthenticated => {
                let key = (state.epoch(), target.clone());
                let mut issued = self.issued.borrow_mut();
                if issued.as_ref() == Some(&key) {
                    return GuardDecision::Blocked;
                }
                *issued = Some(key);

                let url = redirect::login_url(&self.config, target);
                tracing::info!(
                    target_path = %target.path,
                    reason = ?state.last_error(),
                    "redirecting unauthenticated visitor to login"
                );
                GuardDecision::Redirect(url)
            }
        }
    }
}
