//! Root application component with routing and the session context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{ParentRoute, Route, Router, Routes},
};

use crate::components::protected_layout::ProtectedLayout;
use crate::pages::dashboard::DashboardPage;
use crate::pages::login::LoginPage;
use crate::pages::section::{HotelEditPage, Section, SectionPage};
use crate::state::session::{SessionContext, gate_config};

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Owns the single session for the lifetime of the console. Everything under
/// the root `ParentRoute` is protected; `/auth/login` is the only public screen.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_context(SessionContext::new(gate_config()));

    view! {
        <Stylesheet id="leptos" href="/pkg/propdesk.css"/>
        <Title text="propdesk"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=(StaticSegment("auth"), StaticSegment("login")) view=LoginPage/>
                <ParentRoute path=StaticSegment("") view=ProtectedLayout>
                    <Route path=StaticSegment("") view=DashboardPage/>
                    <Route
                        path=StaticSegment("hotels")
                        view=|| view! { <SectionPage section=Section::Hotels/> }
                    />
                    <Route
                        path=(StaticSegment("hotels"), ParamSegment("id"), StaticSegment("edit"))
                        view=HotelEditPage
                    />
                    <Route
                        path=StaticSegment("rooms")
                        view=|| view! { <SectionPage section=Section::Rooms/> }
                    />
                    <Route
                        path=StaticSegment("bookings")
                        view=|| view! { <SectionPage section=Section::Bookings/> }
                    />
                    <Route
                        path=StaticSegment("properties")
                        view=|| view! { <SectionPage section=Section::Properties/> }
                    />
                    <Route
                        path=StaticSegment("investments")
                        view=|| view! { <SectionPage section=Section::Investments/> }
                    />
                    <Route
                        path=StaticSegment("notifications")
                        view=|| view! { <SectionPage section=Section::Notifications/> }
                    />
                </ParentRoute>
            </Routes>
        </Router>
    }
}
