//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` wraps the backend's auth endpoints over HTTP and implements the
//! gate's identity-check seam.

pub mod api;
