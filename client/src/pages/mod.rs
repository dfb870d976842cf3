//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! `login` is public; every other page renders inside `ProtectedLayout` and
//! can assume an authenticated session.

pub mod dashboard;
pub mod login;
pub mod section;
