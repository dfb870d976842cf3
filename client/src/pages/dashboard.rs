//! Dashboard: the default landing screen after login.

use leptos::prelude::*;

use crate::pages::section::Section;
use crate::state::session::use_session;

/// Greets the signed-in user and links every console section.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session();
    let greeting = move || {
        session
            .state
            .with(|s| s.user().map(|u| format!("Welcome back, {}", u.name)))
            .unwrap_or_else(|| "Welcome".to_owned())
    };

    view! {
        <section class="dashboard">
            <h1>{greeting}</h1>
            <div class="dashboard__grid">
                {Section::ALL
                    .iter()
                    .map(|section| {
                        view! {
                            <a class="dashboard__card" href=section.path()>
                                {section.title()}
                            </a>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
