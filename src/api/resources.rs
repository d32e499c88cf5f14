//! Typed per-resource endpoints

use crate::api::client::{ApiClient, ListParams};
use crate::api::error::Result;
use crate::api::form::{MultipartBody, QueryParams};
use crate::api::types::{
    ClaimDetail, ClaimRead, ContractorDetail, ContractorRead, CountryDetail, CountryRead,
    CreateClaim, CreateContractor, CreateCountry, CreateProject, ProjectDetail, ProjectRead,
    UpdateClaim, UpdateContractor, UpdateCountry, UpdateProject,
};

pub const COUNTRIES: &str = "/api/v1/countries/";
pub const PROJECTS: &str = "/api/v1/projects/";
pub const CONTRACTORS: &str = "/api/v1/contractors/";
pub const CLAIMS: &str = "/api/v1/claims/";

// =========================================================================
// Countries
// =========================================================================

pub struct CountriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CountriesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<CountryRead>> {
        self.client.list(COUNTRIES, params).await
    }

    pub async fn get(&self, id: &str) -> Result<CountryDetail> {
        self.client.get(COUNTRIES, id).await
    }

    pub async fn create(&self, req: &CreateCountry) -> Result<CountryRead> {
        let query = QueryParams::new()
            .set("name", req.name.as_str())
            .set_opt("flagUrl", req.flag_url.as_deref());
        let form = MultipartBody::new()
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.create(COUNTRIES, query.as_slice(), form).await
    }

    pub async fn update(&self, id: &str, req: &UpdateCountry) -> Result<CountryDetail> {
        let query = QueryParams::new()
            .set_opt("name", req.name.as_deref())
            .set_opt("flagUrl", req.flag_url.as_deref());
        let form = MultipartBody::new()
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.update(COUNTRIES, id, query.as_slice(), form).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(COUNTRIES, id).await
    }
}

// =========================================================================
// Projects
// =========================================================================

pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<ProjectRead>> {
        self.client.list(PROJECTS, params).await
    }

    pub async fn get(&self, id: &str) -> Result<ProjectDetail> {
        self.client.get(PROJECTS, id).await
    }

    /// Create a project; the server expects `country_id` in snake case here
    pub async fn create(&self, req: &CreateProject) -> Result<ProjectDetail> {
        let query = QueryParams::new()
            .set("name", req.name.as_str())
            .set("country_id", req.country_id.as_str());
        let form = MultipartBody::new()
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.create(PROJECTS, query.as_slice(), form).await
    }

    pub async fn update(&self, id: &str, req: &UpdateProject) -> Result<ProjectDetail> {
        let query = QueryParams::new()
            .set_opt("name", req.name.as_deref())
            .set_opt("countryId", req.country_id.as_deref());
        let form = MultipartBody::new()
            .texts("contractorsIds", req.contractors_ids.iter().flatten())
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.update(PROJECTS, id, query.as_slice(), form).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(PROJECTS, id).await
    }
}

// =========================================================================
// Contractors
// =========================================================================

pub struct ContractorsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ContractorsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<ContractorRead>> {
        self.client.list(CONTRACTORS, params).await
    }

    pub async fn get(&self, id: &str) -> Result<ContractorDetail> {
        self.client.get(CONTRACTORS, id).await
    }

    pub async fn create(&self, req: &CreateContractor) -> Result<ContractorDetail> {
        let query = QueryParams::new().set("name", req.name.as_str());
        let form = MultipartBody::new()
            .texts("projectsIds", &req.projects_ids)
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.create(CONTRACTORS, query.as_slice(), form).await
    }

    pub async fn update(&self, id: &str, req: &UpdateContractor) -> Result<ContractorDetail> {
        let query = QueryParams::new().set_opt("name", req.name.as_deref());
        let form = MultipartBody::new()
            .texts("projectsIds", req.projects_ids.iter().flatten())
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.update(CONTRACTORS, id, query.as_slice(), form).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(CONTRACTORS, id).await
    }
}

// =========================================================================
// Claims
// =========================================================================

pub struct ClaimsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ClaimsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<ClaimRead>> {
        self.client.list(CLAIMS, params).await
    }

    pub async fn get(&self, id: &str) -> Result<ClaimDetail> {
        self.client.get(CLAIMS, id).await
    }

    pub async fn create(&self, req: &CreateClaim) -> Result<ClaimDetail> {
        let query = QueryParams::new()
            .set("name", req.name.as_str())
            .set("contractorId", req.contractor_id.as_str())
            .set("projectId", req.project_id.as_str());
        let form = MultipartBody::new()
            .file("claimFile", Some(req.claim_file.as_path()))
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.create(CLAIMS, query.as_slice(), form).await
    }

    pub async fn update(&self, id: &str, req: &UpdateClaim) -> Result<ClaimDetail> {
        let query = QueryParams::new()
            .set_opt("name", req.name.as_deref())
            .set_opt("contractorId", req.contractor_id.as_deref())
            .set_opt("projectId", req.project_id.as_deref());
        let form = MultipartBody::new()
            .file("claimFile", req.claim_file.as_deref())
            .files("contextFiles", &req.context_files)
            .into_form()
            .await?;
        self.client.update(CLAIMS, id, query.as_slice(), form).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(CLAIMS, id).await
    }
}
