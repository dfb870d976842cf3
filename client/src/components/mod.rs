//! Reusable UI components.

pub mod nav_bar;
pub mod protected_layout;
