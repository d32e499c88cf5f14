//! Remote backend - records live behind the REST API

use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::api::types::{
    CreateClaim, CreateContractor, CreateCountry, CreateProject, UpdateClaim, UpdateContractor,
    UpdateCountry, UpdateProject,
};
use crate::api::{ApiClient, ApiError, ListParams, DEFAULT_LIMIT};
use crate::core::identity::EntityId;
use crate::entities::{
    Attachment, Claim, ClaimDraft, Contractor, ContractorDraft, Country, CountryDraft, Project,
    ProjectDraft,
};
use crate::store::backend::{Backend, CascadeAuthority, Result};

/// Stop paging after this many pages even if the server keeps returning
/// full ones
const MAX_PAGES: u32 = 1000;

/// Backend talking to the REST API
///
/// The server cascades project and contractor deletions itself.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    api: ApiClient,
    page_size: u32,
}

impl RemoteBackend {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        let page_size = if page_size == 0 { DEFAULT_LIMIT } else { page_size };
        Self { api, page_size }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fetch every page of a list endpoint, stopping at the first short page
    async fn list_all<T, F, Fut>(&self, kind: &str, fetch: F) -> Result<Vec<T>>
    where
        F: Fn(ListParams) -> Fut,
        Fut: Future<Output = std::result::Result<Vec<T>, ApiError>>,
    {
        let mut params = ListParams::page(0, self.page_size);
        let mut all = Vec::new();

        for _ in 0..MAX_PAGES {
            let page = fetch(params).await?;
            let len = page.len();
            all.extend(page);
            if len < params.limit as usize {
                debug!("Fetched {} {}", all.len(), kind);
                return Ok(all);
            }
            params = params.next();
        }

        warn!("Stopped paging {} after {} pages", kind, MAX_PAGES);
        Ok(all)
    }
}

/// Local files that still need to be sent with the next request
fn pending_uploads(files: &[Attachment]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|f| f.is_pending_upload())
        .map(Attachment::local_path)
        .collect()
}

fn id_strings(ids: &[EntityId]) -> Vec<String> {
    ids.iter().map(EntityId::to_string).collect()
}

#[async_trait]
impl Backend for RemoteBackend {
    fn cascade_authority(&self) -> CascadeAuthority {
        CascadeAuthority::Server
    }

    fn describe(&self) -> String {
        format!("remote ({})", self.api.base_url())
    }

    async fn list_countries(&self) -> Result<Vec<Country>> {
        let countries = self.api.countries();
        let reads = self
            .list_all("countries", |params| countries.list(params))
            .await?;
        Ok(reads.into_iter().map(Country::from).collect())
    }

    async fn create_country(&self, draft: CountryDraft) -> Result<Country> {
        draft.validate()?;
        let req = CreateCountry {
            name: draft.name.trim().to_string(),
            flag_url: draft.flag_url,
            context_files: draft.context_files,
        };
        Ok(self.api.countries().create(&req).await?.into())
    }

    async fn update_country(&self, country: &Country) -> Result<Country> {
        country.validate()?;
        let req = UpdateCountry {
            name: Some(country.name.clone()),
            flag_url: country.flag_url.clone(),
            context_files: pending_uploads(&country.context_files),
        };
        Ok(self
            .api
            .countries()
            .update(country.id.as_str(), &req)
            .await?
            .into())
    }

    async fn delete_country(&self, id: &EntityId) -> Result<()> {
        Ok(self.api.countries().delete(id.as_str()).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = self.api.projects();
        let reads = self
            .list_all("projects", |params| projects.list(params))
            .await?;
        Ok(reads.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, draft: ProjectDraft) -> Result<Project> {
        draft.validate()?;
        let req = CreateProject {
            name: draft.title.trim().to_string(),
            country_id: draft.country_id.map(|c| c.to_string()).unwrap_or_default(),
            context_files: draft.context_files,
        };
        Ok(self.api.projects().create(&req).await?.into())
    }

    async fn update_project(&self, project: &Project) -> Result<Project> {
        project.validate()?;
        let req = UpdateProject {
            name: Some(project.title.clone()),
            country_id: project.country_id.as_ref().map(EntityId::to_string),
            contractors_ids: None,
            context_files: pending_uploads(&project.context_files),
        };
        Ok(self
            .api
            .projects()
            .update(project.id.as_str(), &req)
            .await?
            .into())
    }

    async fn delete_project(&self, id: &EntityId) -> Result<()> {
        Ok(self.api.projects().delete(id.as_str()).await?)
    }

    /// The list endpoint omits project edges, so each contractor's detail is
    /// fetched as well. A failed detail falls back to the bare list entry.
    async fn list_contractors(&self) -> Result<Vec<Contractor>> {
        let contractors = self.api.contractors();
        let reads = self
            .list_all("contractors", |params| contractors.list(params))
            .await?;

        let details = join_all(reads.iter().map(|c| contractors.get(&c.id))).await;

        Ok(reads
            .into_iter()
            .zip(details)
            .map(|(read, detail)| match detail {
                Ok(detail) => Contractor::from(detail),
                Err(e) => {
                    warn!("Failed to load projects for contractor {}: {}", read.id, e);
                    Contractor::from(read)
                }
            })
            .collect())
    }

    async fn create_contractor(&self, draft: ContractorDraft) -> Result<Contractor> {
        draft.validate()?;
        let req = CreateContractor {
            name: draft.name.trim().to_string(),
            projects_ids: id_strings(&draft.project_ids),
            context_files: draft.context_files,
        };
        Ok(self.api.contractors().create(&req).await?.into())
    }

    async fn update_contractor(&self, contractor: &Contractor) -> Result<Contractor> {
        contractor.validate()?;
        let req = UpdateContractor {
            name: Some(contractor.name.clone()),
            projects_ids: Some(id_strings(&contractor.project_ids)),
            context_files: pending_uploads(&contractor.context_files),
        };
        Ok(self
            .api
            .contractors()
            .update(contractor.id.as_str(), &req)
            .await?
            .into())
    }

    async fn delete_contractor(&self, id: &EntityId) -> Result<()> {
        Ok(self.api.contractors().delete(id.as_str()).await?)
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        let claims = self.api.claims();
        let reads = self.list_all("claims", |params| claims.list(params)).await?;
        Ok(reads.into_iter().map(Claim::from).collect())
    }

    /// The server does not echo the claim file or the context flags, so the
    /// returned record carries them over from the draft
    async fn create_claim(&self, draft: ClaimDraft) -> Result<Claim> {
        let (contractor_id, project_id, claim_file) = draft.required()?;
        let req = CreateClaim {
            name: draft.title.trim().to_string(),
            contractor_id: contractor_id.to_string(),
            project_id: project_id.to_string(),
            claim_file: claim_file.clone(),
            context_files: draft.context_files.clone(),
        };

        let mut claim = Claim::from(self.api.claims().create(&req).await?);
        claim.claim_file = Some(Attachment::from_path(&req.claim_file));
        claim.included_project_context = draft.included_project_context;
        claim.included_contractor_context = draft.included_contractor_context;
        Ok(claim)
    }

    async fn update_claim(&self, claim: &Claim) -> Result<Claim> {
        claim.validate()?;
        let req = UpdateClaim {
            name: Some(claim.title.clone()),
            contractor_id: Some(claim.contractor_id.to_string()),
            project_id: Some(claim.project_id.to_string()),
            claim_file: claim
                .claim_file
                .as_ref()
                .filter(|f| f.is_pending_upload())
                .map(Attachment::local_path),
            context_files: pending_uploads(&claim.context_files),
        };

        let mut updated = Claim::from(self.api.claims().update(claim.id.as_str(), &req).await?);
        updated.claim_file = claim.claim_file.clone();
        updated.included_project_context = claim.included_project_context;
        updated.included_contractor_context = claim.included_contractor_context;
        Ok(updated)
    }

    async fn delete_claim(&self, id: &EntityId) -> Result<()> {
        Ok(self.api.claims().delete(id.as_str()).await?)
    }
}
