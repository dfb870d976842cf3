//! Top navigation: section links, signed-in identity, and logout.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::pages::section::Section;
use crate::state::session::use_session;

#[component]
pub fn NavBar() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let location = use_location();
    let active = Memo::new(move |_| Section::for_path(&location.pathname.get()));

    let user_name = move || {
        session
            .state
            .with(|s| s.user().map(|u| u.name.clone()))
            .unwrap_or_default()
    };

    let on_logout = move |_| {
        let login_path = session.login_path();
        let navigate = navigate.clone();
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            crate::net::api::logout().await;
            navigate(&login_path, NavigateOptions { replace: true, ..Default::default() });
            session.logout();
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (login_path, navigate, NavigateOptions::default());
        }
    };

    view! {
        <nav class="nav-bar">
            <a href="/" class="nav-bar__brand">"propdesk"</a>
            <ul class="nav-bar__links">
                {Section::ALL
                    .iter()
                    .map(|&section| {
                        view! {
                            <li class:active=move || active.get() == Some(section)>
                                <a href=section.path()>{section.title()}</a>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
            <span class="nav-bar__user">{user_name}</span>
            <button class="nav-bar__logout" on:click=on_logout>
                "Log out"
            </button>
        </nav>
    }
}
