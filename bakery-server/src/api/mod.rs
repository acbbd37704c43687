//! API routes
//!
//! - [`health`] - liveness
//! - [`modules`] - module catalog
//! - [`user_modules`] - the caller's granted modules
//! - [`role_modules`] - admin role-module assignment

pub mod health;
pub mod modules;
pub mod role_modules;
pub mod user_modules;
