//! Navigation guard mounted at the root of the protected route tree.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen except login renders through this layout's `<Outlet/>`. The
//! decision logic lives in `gate::NavigationGuard`; this component feeds it
//! the mirrored session snapshot and the router location, and acts on it.
//!
//! While the session is unknown or being checked only a loading placeholder is
//! rendered, so protected content never flashes. Redirects replace the current
//! history entry so back-navigation does not return to the blocked page.

use gate::{GuardDecision, RedirectTarget, SessionState, SessionStatus};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Outlet;
use leptos_router::hooks::{use_location, use_navigate};

use crate::components::nav_bar::NavBar;
use crate::state::session::use_session;

#[component]
pub fn ProtectedLayout() -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let navigate = use_navigate();
    let guard = StoredValue::new_local(session.guard());

    // Verify on first mount, and again whenever logout drops the session back
    // to unknown. Concurrent mounts join the same in-flight request.
    Effect::new(move || {
        let state = session.state.get();
        if guard.with_value(|g| g.should_verify(&state)) {
            session.verify();
        }
    });

    Effect::new(move || {
        let state = session.state.get();
        let target = RedirectTarget::new(location.pathname.get(), location.search.get());
        let decision = guard.with_value(|g| g.evaluate(&state, &target));
        if let GuardDecision::Redirect(url) = decision {
            navigate(&url, NavigateOptions { replace: true, ..Default::default() });
        }
    });

    let status = Memo::new(move |_| session.state.with(SessionState::status));

    view! {
        <div class="app-shell">
            {move || match status.get() {
                SessionStatus::Authenticated => {
                    view! {
                        <NavBar/>
                        <main class="app-main">
                            <Outlet/>
                        </main>
                    }
                        .into_any()
                }
                SessionStatus::Unknown | SessionStatus::Checking => {
                    view! {
                        <div class="session-loading" role="status">
                            "Checking your session..."
                        </div>
                    }
                        .into_any()
                }
                SessionStatus::Unauthenticated => ().into_any(),
            }}
        </div>
    }
}
