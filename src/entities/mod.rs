//! Entity type definitions

pub mod attachment;
pub mod claim;
pub mod contractor;
pub mod country;
pub mod flags;
pub mod project;

pub use attachment::Attachment;
pub use claim::{Claim, ClaimDraft};
pub use contractor::{Contractor, ContractorDraft};
pub use country::{Country, CountryDraft};
pub use project::{Project, ProjectDraft};
