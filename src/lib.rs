//! Claimdesk: a console for countries, projects, contractors and claims
//!
//! Records live either in a local JSON store or behind the claims REST API.
//! The [`store::Store`] keeps the four collections in memory, applies
//! mutations through a [`store::Backend`] and keeps dependent records
//! consistent when a project or contractor is deleted.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
pub mod notify;
pub mod store;
