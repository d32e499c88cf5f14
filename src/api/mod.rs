//! REST client - typed access to the countries, projects, contractors and
//! claims endpoints
//!
//! Every call returns the parsed body or an [`ApiError`]. No caching and no
//! retries happen at this layer.

pub mod client;
pub mod convert;
pub mod error;
pub mod form;
pub mod resources;
pub mod types;

pub use client::{ApiClient, ListParams, DEFAULT_LIMIT};
pub use error::{ApiError, Detail, HttpValidationError, LocSegment, ValidationDetail};
pub use resources::{ClaimsApi, ContractorsApi, CountriesApi, ProjectsApi};
