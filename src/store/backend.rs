//! Backend trait - where records are persisted

use async_trait::async_trait;

use crate::core::identity::EntityId;
use crate::entities::{
    Claim, ClaimDraft, Contractor, ContractorDraft, Country, CountryDraft, Project, ProjectDraft,
};
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Who removes the dependents of a deleted project or contractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAuthority {
    /// The store computes the cascade and persists every dependent change
    Client,
    /// The backend cascades on its own; the store only re-reads dependents
    Server,
}

/// Persistence for the four record collections
///
/// Creates take a validated draft and return the record as stored, with the
/// id and timestamp the backend assigned. Updates are full replacements.
#[async_trait]
pub trait Backend: Send + Sync {
    fn cascade_authority(&self) -> CascadeAuthority;

    /// Human-readable location, shown by the dashboard
    fn describe(&self) -> String;

    async fn list_countries(&self) -> Result<Vec<Country>>;
    async fn create_country(&self, draft: CountryDraft) -> Result<Country>;
    async fn update_country(&self, country: &Country) -> Result<Country>;
    async fn delete_country(&self, id: &EntityId) -> Result<()>;

    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, draft: ProjectDraft) -> Result<Project>;
    async fn update_project(&self, project: &Project) -> Result<Project>;
    async fn delete_project(&self, id: &EntityId) -> Result<()>;

    async fn list_contractors(&self) -> Result<Vec<Contractor>>;
    async fn create_contractor(&self, draft: ContractorDraft) -> Result<Contractor>;
    async fn update_contractor(&self, contractor: &Contractor) -> Result<Contractor>;
    async fn delete_contractor(&self, id: &EntityId) -> Result<()>;

    async fn list_claims(&self) -> Result<Vec<Claim>>;
    async fn create_claim(&self, draft: ClaimDraft) -> Result<Claim>;
    async fn update_claim(&self, claim: &Claim) -> Result<Claim>;
    async fn delete_claim(&self, id: &EntityId) -> Result<()>;
}
