//! End-to-end gate scenarios: store, verifier, guard, and redirect together.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use gate::{
    CheckOutcome, GateConfig, GuardDecision, Identity, IdentityCheck, RedirectTarget, SessionGate, SessionStatus,
    Timer, UnauthenticatedReason, redirect,
};

#[derive(Default)]
struct Backend {
    calls: Cell<u32>,
    in_flight: Cell<u32>,
    max_in_flight: Cell<u32>,
    pending: RefCell<VecDeque<oneshot::Sender<CheckOutcome>>>,
}

impl Backend {
    fn respond(&self, outcome: CheckOutcome) {
        let tx = self.pending.borrow_mut().pop_front().expect("no pending identity check");
        tx.send(outcome).expect("identity check receiver dropped");
    }
}

#[async_trait(?Send)]
impl IdentityCheck for Backend {
    async fn check(&self) -> CheckOutcome {
        self.calls.set(self.calls.get() + 1);
        self.in_flight.set(self.in_flight.get() + 1);
        self.max_in_flight.set(self.max_in_flight.get().max(self.in_flight.get()));
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(tx);
        let outcome = rx.await.unwrap_or_else(|_| CheckOutcome::Failed("responder dropped".to_owned()));
        self.in_flight.set(self.in_flight.get() - 1);
        outcome
    }
}

struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

struct TokioSpawner;

impl LocalSpawn for TokioSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::task::spawn_local(future);
        Ok(())
    }
}

/// Runs a test body on a `LocalSet` so spawned verifications make progress.
async fn local<F: Future>(body: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(body).await
}

fn alice() -> Identity {
    Identity {
        id: "u-1".to_owned(),
        name: "Alice".to_owned(),
        email: Some("alice@example.com".to_owned()),
        roles: vec!["manager".to_owned()],
    }
}

fn gate_with(backend: &Rc<Backend>) -> SessionGate {
    SessionGate::new(
        GateConfig::default().with_verify_timeout(Duration::from_secs(5)),
        backend.clone(),
        Rc::new(TokioTimer),
        Rc::new(TokioSpawner),
    )
}

async fn settle(backend: &Backend, outcome: CheckOutcome) {
    tokio::task::yield_now().await;
    backend.respond(outcome);
}

#[tokio::test]
async fn unauthenticated_visitor_is_sent_to_login_with_destination() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        let guard = gate.guard();
        let target = RedirectTarget::new("/hotels/42/edit", "");

        assert!(guard.should_verify(&gate.state()));
        let (state, ()) = futures::join!(gate.verify(), settle(&backend, CheckOutcome::Rejected));

        let GuardDecision::Redirect(url) = guard.evaluate(&state, &target) else {
            panic!("expected a redirect");
        };
        assert_eq!(url, "/auth/login?redirect=%2Fhotels%2F42%2Fedit");

        let search = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let recovered = redirect::destination_from_search(search, gate.config());
        assert_eq!(recovered, RedirectTarget::new("/hotels/42/edit", ""));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn hanging_verification_times_out_and_redirects_exactly_once() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        let guard = gate.guard();
        let target = RedirectTarget::new("/bookings", "status=open");

        let decisions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&decisions);
        let observer = gate.guard();
        let observed_target = target.clone();
        let _sub = gate.subscribe(move |state| sink.borrow_mut().push(observer.evaluate(state, &observed_target)));

        let state = gate.verify().await;
        assert_eq!(state.status(), SessionStatus::Unauthenticated);
        assert_eq!(state.last_error(), Some(UnauthenticatedReason::Timeout));

        // Repeated renders of the same mount after the timeout.
        let renders: Vec<GuardDecision> = (0..4).map(|_| guard.evaluate(&gate.state(), &target)).collect();
        let redirects = renders.iter().filter(|d| matches!(d, GuardDecision::Redirect(_))).count();
        assert_eq!(redirects, 1);
        assert!(renders[1..].iter().all(|d| *d == GuardDecision::Blocked));

        assert_eq!(*decisions.borrow(), vec![
            GuardDecision::Loading,
            GuardDecision::Redirect("/auth/login?redirect=%2Fbookings%3Fstatus%3Dopen".to_owned()),
        ]);
    })
    .await;
}

#[tokio::test]
async fn nested_guards_share_one_request_and_resolve_together() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        let outer = gate.guard();
        let inner = gate.guard();
        let target = RedirectTarget::new("/properties/7", "");

        assert!(outer.should_verify(&gate.state()));
        let outer_handle = gate.verify();
        assert!(!inner.should_verify(&gate.state()));
        let inner_handle = gate.verify();
        assert_eq!(outer.evaluate(&gate.state(), &target), GuardDecision::Loading);
        assert_eq!(inner.evaluate(&gate.state(), &target), GuardDecision::Loading);

        let (outer_state, inner_state, ()) = futures::join!(
            outer_handle,
            inner_handle,
            settle(&backend, CheckOutcome::Authenticated(alice()))
        );

        assert_eq!(backend.calls.get(), 1);
        assert_eq!(gate.verifier().requests_issued(), 1);
        assert_eq!(outer_state, inner_state);
        assert_eq!(outer.evaluate(&outer_state, &target), GuardDecision::Render);
        assert_eq!(inner.evaluate(&inner_state, &target), GuardDecision::Render);
    })
    .await;
}

#[tokio::test]
async fn mount_unmount_churn_keeps_one_request_in_flight() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);

        for _ in 0..5 {
            let guard = gate.guard();
            let mut handle = gate.verify();
            assert!(futures::poll!(&mut handle).is_pending());
            drop(handle);
            drop(guard);
        }
        assert_eq!(backend.max_in_flight.get(), 1);
        assert_eq!(gate.verifier().requests_issued(), 1);

        let (state, ()) = futures::join!(gate.verify(), settle(&backend, CheckOutcome::Authenticated(alice())));
        assert!(state.is_authenticated());
        assert_eq!(backend.calls.get(), 1);
    })
    .await;
}

#[tokio::test]
async fn login_with_preserved_token_returns_to_original_path() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);

        let (state, ()) = futures::join!(gate.verify(), settle(&backend, CheckOutcome::Rejected));
        let GuardDecision::Redirect(url) = gate.guard().evaluate(&state, &RedirectTarget::new("/hotels/42/edit", "")) else {
            panic!("expected a redirect");
        };
        let search = format!("?{}", url.split_once('?').map(|(_, q)| q).unwrap_or_default());

        let (destination, ()) = futures::join!(
            gate.complete_login(&search),
            settle(&backend, CheckOutcome::Authenticated(alice()))
        );

        assert_eq!(destination, Some(RedirectTarget::new("/hotels/42/edit", "")));
        assert_eq!(gate.state().user(), Some(&alice()));
    })
    .await;
}

#[tokio::test]
async fn login_without_token_lands_on_default_path() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);

        let (destination, ()) = futures::join!(
            gate.complete_login(""),
            settle(&backend, CheckOutcome::Authenticated(alice()))
        );
        assert_eq!(destination, Some(RedirectTarget::new("/", "")));
    })
    .await;
}

#[tokio::test]
async fn failed_login_verification_yields_no_destination() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);

        let (destination, ()) = futures::join!(
            gate.complete_login("?redirect=%2Frooms"),
            settle(&backend, CheckOutcome::Failed("502 bad gateway".to_owned()))
        );
        assert_eq!(destination, None);
        assert_eq!(gate.state().last_error(), Some(UnauthenticatedReason::VerificationFailed));
    })
    .await;
}

#[tokio::test]
async fn logout_resets_and_next_protected_navigation_reverifies() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        futures::join!(gate.verify(), settle(&backend, CheckOutcome::Authenticated(alice())));
        assert!(gate.state().is_authenticated());

        gate.logout();
        let guard = gate.guard();
        assert!(gate.state().user().is_none());
        assert!(guard.should_verify(&gate.state()));
        assert_eq!(guard.evaluate(&gate.state(), &RedirectTarget::new("/", "")), GuardDecision::Loading);

        let (state, ()) = futures::join!(gate.verify(), settle(&backend, CheckOutcome::Rejected));
        assert_eq!(state.status(), SessionStatus::Unauthenticated);
        assert_eq!(backend.calls.get(), 2);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn guard_unmounted_mid_check_still_resolves_by_timeout() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        {
            let guard = gate.guard();
            assert!(guard.should_verify(&gate.state()));
            let mut handle = gate.verify();
            assert!(futures::poll!(&mut handle).is_pending());
        }

        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(gate.state().status(), SessionStatus::Unauthenticated);
        assert_eq!(gate.state().last_error(), Some(UnauthenticatedReason::Timeout));
        assert!(!gate.verifier().is_in_flight());
        let remount = gate.guard();
        assert_eq!(
            remount.evaluate(&gate.state(), &RedirectTarget::new("/rooms", "")),
            GuardDecision::Redirect("/auth/login?redirect=%2Frooms".to_owned())
        );
    })
    .await;
}

#[tokio::test]
async fn login_during_pending_check_discards_the_abandoned_result() {
    local(async {
        let backend = Rc::new(Backend::default());
        let gate = gate_with(&backend);
        let mut early = gate.verify();
        assert!(futures::poll!(&mut early).is_pending());

        let respond = async {
            tokio::task::yield_now().await;
            backend.respond(CheckOutcome::Rejected);
            backend.respond(CheckOutcome::Authenticated(alice()));
        };
        let (destination, ()) = futures::join!(gate.complete_login("?redirect=%2Frooms"), respond);

        assert_eq!(destination, Some(RedirectTarget::new("/rooms", "")));
        // The abandoned request overlaps the fresh one; its answer is dropped.
        assert_eq!(backend.calls.get(), 2);
        assert_eq!(backend.max_in_flight.get(), 2);
        assert_eq!(gate.verifier().requests_issued(), 2);

        let stale = early.await;
        assert!(stale.is_authenticated());
        assert!(gate.state().is_authenticated());
        assert!(gate.state().last_error().is_none());
    })
    .await;
}
