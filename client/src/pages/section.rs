//! Domain section screens (hotels, rooms, bookings, properties, investments,
//! notifications).
//!
//! These screens only exist behind the session gate; their record tables and
//! forms are bound to the backend's resource endpoints elsewhere.

#[cfg(test)]
#[path = "section_test.rs"]
mod section_test;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Hotels,
    Rooms,
    Bookings,
    Properties,
    Investments,
    Notifications,
}

impl Section {
    /// Navigation order.
    pub const ALL: [Section; 6] = [
        Section::Hotels,
        Section::Rooms,
        Section::Bookings,
        Section::Properties,
        Section::Investments,
        Section::Notifications,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Hotels => "/hotels",
            Self::Rooms => "/rooms",
            Self::Bookings => "/bookings",
            Self::Properties => "/properties",
            Self::Investments => "/investments",
            Self::Notifications => "/notifications",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Hotels => "Hotels",
            Self::Rooms => "Rooms",
            Self::Bookings => "Bookings",
            Self::Properties => "Properties",
            Self::Investments => "Investments",
            Self::Notifications => "Notifications",
        }
    }

    /// Section owning an in-app path, matched on the first segment.
    pub fn for_path(path: &str) -> Option<Self> {
        let first = path.trim_start_matches('/').split('/').next()?;
        Self::ALL.into_iter().find(|s| s.path().trim_start_matches('/') == first)
    }
}

#[component]
pub fn SectionPage(section: Section) -> impl IntoView {
    view! {
        <section class="section-page">
            <h1>{section.title()}</h1>
            <div class="section-page__records" data-section=section.path()></div>
        </section>
    }
}

/// Hotel edit screen at `/hotels/:id/edit`.
#[component]
pub fn HotelEditPage() -> impl IntoView {
    let params = use_params_map();
    let hotel_id = move || params.with(|p| p.get("id").unwrap_or_default());

    view! {
        <section class="section-page">
            <h1>"Edit hotel " {hotel_id}</h1>
            <a href=Section::Hotels.path()>"Back to hotels"</a>
        </section>
    }
}
