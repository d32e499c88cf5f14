//! CLI command implementations

pub mod check;
pub mod claim;
pub mod completions;
pub mod contractor;
pub mod country;
pub mod dashboard;
pub mod flags;
pub mod project;
