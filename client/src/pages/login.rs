//! Login page with email + password sign-in.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the gate's login entry point. The guard sends rejected visitors
//! here with their destination encoded in `?redirect=`; after a successful
//! submission the session is re-verified and the visitor is replayed to that
//! destination (or the default landing path).

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use gate::UnauthenticatedReason;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::session::use_session;

fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Explanation shown when the gate sent the visitor here after a failed check.
fn session_notice(reason: Option<UnauthenticatedReason>) -> Option<&'static str> {
    match reason? {
        UnauthenticatedReason::Rejected => None,
        UnauthenticatedReason::VerificationFailed => {
            Some("We couldn't reach the server to check your session. Please sign in again.")
        }
        UnauthenticatedReason::Timeout => Some("Checking your session took too long. Please sign in again."),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let notice = move || session.state.with(|s| session_notice(s.last_error()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(input) => input,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());
        let search = location.search.get_untracked();
        let navigate = navigate.clone();

        #[cfg(feature = "hydrate")]
        {
            let gate = session.gate();
            leptos::task::spawn_local(async move {
                if let Err(e) = crate::net::api::login(&email_value, &password_value).await {
                    info.set(e);
                    busy.set(false);
                    return;
                }
                match gate.complete_login(&search).await {
                    Some(destination) => {
                        password.set(String::new());
                        navigate(&destination.to_string(), NavigateOptions { replace: true, ..Default::default() });
                    }
                    None => {
                        info.set("Signed in, but the session could not be verified. Try again.".to_owned());
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email_value, password_value, search, navigate, NavigateOptions::default());
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"propdesk"</h1>
                <p class="login-card__subtitle">"Sign in to the admin console"</p>
                {move || notice().map(|text| view! { <p class="login-message login-message--notice">{text}</p> })}
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        autocomplete="username"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign in"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
