//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! The console's only cross-screen state is the authenticated session; domain
//! screens load their own data once the gate admits them.

pub mod session;
