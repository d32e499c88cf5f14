//! Store - the in-memory view of all four collections
//!
//! A `Store` is built once at startup around a [`Backend`] and a
//! [`Notifier`]. Reads are linear scans over the loaded collections; every
//! mutation goes through the backend first and is reflected in memory only
//! once the backend accepted it.

pub mod backend;
pub mod cascade;
pub mod check;
pub mod local;
pub mod remote;

pub use backend::{Backend, CascadeAuthority};
pub use cascade::{CascadeOutcome, CascadePlan};
pub use check::DanglingRef;
pub use local::{LocalBackend, LocalStoreError};
pub use remote::RemoteBackend;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::ApiError;
use crate::core::entity::{find_by_id, title_case, Entity};
use crate::core::identity::EntityId;
use crate::core::validation::ValidationErrors;
use crate::entities::{
    Claim, ClaimDraft, Contractor, ContractorDraft, Country, CountryDraft, Project, ProjectDraft,
};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Local(#[from] LocalStoreError),

    /// The parent is gone but a dependent step failed; `outcome` holds the
    /// changes that did persist
    #[error("{parent} was deleted but its dependents were only partly updated: {source}")]
    PartialCascade {
        parent: EntityId,
        outcome: Box<CascadeOutcome>,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::PartialCascade { parent, source, .. } => format!(
                "{} was deleted but its dependents were only partly updated: {}",
                parent,
                source.user_message()
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A collection that could not be loaded during [`Store::refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub collection: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub failures: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Keep a successful fetch, or record the failure and fall back to empty
    fn settle<T>(&mut self, collection: &'static str, result: Result<Vec<T>>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to load {}: {}", collection, e);
                self.failures.push(RefreshFailure {
                    collection,
                    message: e.user_message(),
                });
                Vec::new()
            }
        }
    }
}

/// Per-kind record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Dashboard {
    pub countries: usize,
    pub projects: usize,
    pub contractors: usize,
    pub claims: usize,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

/// Record kinds whose deletion cascades
#[derive(Debug, Clone, Copy)]
enum Parent {
    Project,
    Contractor,
}

pub struct Store {
    backend: Box<dyn Backend>,
    notifier: Box<dyn Notifier>,
    countries: Vec<Country>,
    projects: Vec<Project>,
    contractors: Vec<Contractor>,
    claims: Vec<Claim>,
}

impl Store {
    /// Create an empty store; call [`Store::refresh`] to load records
    pub fn new(backend: impl Backend + 'static, notifier: impl Notifier + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            notifier: Box::new(notifier),
            countries: Vec::new(),
            projects: Vec::new(),
            contractors: Vec::new(),
            claims: Vec::new(),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Load all four collections concurrently
    ///
    /// A collection that fails to load is left empty and listed in the
    /// report; the others are still replaced.
    pub async fn refresh(&mut self) -> RefreshReport {
        let backend = self.backend.as_ref();
        let (countries, projects, contractors, claims) = tokio::join!(
            backend.list_countries(),
            backend.list_projects(),
            backend.list_contractors(),
            backend.list_claims(),
        );

        let mut report = RefreshReport::default();
        self.countries = report.settle(Country::KIND_PLURAL, countries);
        self.projects = report.settle(Project::KIND_PLURAL, projects);
        self.contractors = report.settle(Contractor::KIND_PLURAL, contractors);
        self.claims = report.settle(Claim::KIND_PLURAL, claims);

        info!(
            "Loaded {} countries, {} projects, {} contractors, {} claims",
            self.countries.len(),
            self.projects.len(),
            self.contractors.len(),
            self.claims.len()
        );
        report
    }

    // =====================================================================
    // Lookups
    // =====================================================================

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn contractors(&self) -> &[Contractor] {
        &self.contractors
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn country(&self, id: &str) -> Option<&Country> {
        find_by_id(&self.countries, id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        find_by_id(&self.projects, id)
    }

    pub fn contractor(&self, id: &str) -> Option<&Contractor> {
        find_by_id(&self.contractors, id)
    }

    pub fn claim(&self, id: &str) -> Option<&Claim> {
        find_by_id(&self.claims, id)
    }

    pub fn projects_for_country(&self, country_id: &str) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.country_id.as_ref().is_some_and(|c| c.as_str() == country_id))
            .collect()
    }

    pub fn contractors_for_project(&self, project_id: &str) -> Vec<&Contractor> {
        self.contractors
            .iter()
            .filter(|c| c.works_on(project_id))
            .collect()
    }

    /// Projects on the contractor's list, skipping ids that are not loaded
    pub fn projects_for_contractor(&self, contractor_id: &str) -> Vec<&Project> {
        let Some(contractor) = self.contractor(contractor_id) else {
            return Vec::new();
        };
        contractor
            .project_ids
            .iter()
            .filter_map(|id| self.project(id.as_str()))
            .collect()
    }

    pub fn claims_for_project(&self, project_id: &str) -> Vec<&Claim> {
        self.claims
            .iter()
            .filter(|c| c.project_id.as_str() == project_id)
            .collect()
    }

    pub fn claims_for_contractor(&self, contractor_id: &str) -> Vec<&Claim> {
        self.claims
            .iter()
            .filter(|c| c.contractor_id.as_str() == contractor_id)
            .collect()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            countries: self.countries.len(),
            projects: self.projects.len(),
            contractors: self.contractors.len(),
            claims: self.claims.len(),
        }
    }

    pub fn check_references(&self) -> Vec<DanglingRef> {
        check::dangling_references(
            &self.countries,
            &self.projects,
            &self.contractors,
            &self.claims,
        )
    }

    // =====================================================================
    // Countries
    // =====================================================================

    pub async fn add_country(&mut self, draft: CountryDraft) -> Result<Country> {
        draft.validate()?;
        let result = self.backend.create_country(draft).await;
        let country = self.settle(Action::Create, result)?;
        self.countries.push(country.clone());
        Ok(country)
    }

    pub async fn update_country(&mut self, country: Country) -> Result<Country> {
        country.validate()?;
        let result = self.backend.update_country(&country).await;
        let updated = self.settle(Action::Update, result)?;
        upsert(&mut self.countries, updated.clone());
        Ok(updated)
    }

    /// Delete a country; its projects are left in place
    pub async fn delete_country(&mut self, id: &str) -> Result<Option<Country>> {
        let Some(country) = self.country(id).cloned() else {
            debug!("Country {} not loaded, nothing to delete", id);
            return Ok(None);
        };

        let result = self.backend.delete_country(&country.id).await;
        self.fail_on_err::<Country, _>(Action::Delete, result)?;
        self.countries.retain(|c| c.id != country.id);

        let orphaned = self.projects_for_country(country.id.as_str()).len();
        if orphaned > 0 {
            warn!(
                "{} project(s) still reference deleted country {}",
                orphaned, country.id
            );
        }

        self.deleted::<Country>(format!("{} has been deleted successfully.", country.name));
        Ok(Some(country))
    }

    // =====================================================================
    // Projects
    // =====================================================================

    pub async fn add_project(&mut self, draft: ProjectDraft) -> Result<Project> {
        draft.validate()?;
        let result = self.backend.create_project(draft).await;
        let project = self.settle(Action::Create, result)?;
        self.projects.push(project.clone());
        Ok(project)
    }

    pub async fn update_project(&mut self, project: Project) -> Result<Project> {
        project.validate()?;
        let result = self.backend.update_project(&project).await;
        let updated = self.settle(Action::Update, result)?;
        upsert(&mut self.projects, updated.clone());
        Ok(updated)
    }

    /// Delete a project along with its dependents
    ///
    /// Contractors working only on this project are deleted, the others
    /// lose it from their list, and claims raised against it are deleted.
    pub async fn delete_project(&mut self, id: &str) -> Result<Option<CascadeOutcome>> {
        let Some(project) = self.project(id).cloned() else {
            debug!("Project {} not loaded, nothing to delete", id);
            return Ok(None);
        };

        let result = match self.backend.cascade_authority() {
            CascadeAuthority::Client => {
                let plan = CascadePlan::for_project(
                    project.id.as_str(),
                    &self.contractors,
                    &self.claims,
                );
                self.apply_cascade(Parent::Project, &project.id, plan).await
            }
            CascadeAuthority::Server => {
                self.delete_with_server_cascade(Parent::Project, &project.id)
                    .await
            }
        };
        let outcome = self.fail_on_err::<Project, _>(Action::Delete, result)?;

        self.deleted::<Project>(format!(
            "{} and all associated content has been deleted.",
            project.title
        ));
        Ok(Some(outcome))
    }

    // =====================================================================
    // Contractors
    // =====================================================================

    pub async fn add_contractor(&mut self, draft: ContractorDraft) -> Result<Contractor> {
        draft.validate()?;
        let result = self.backend.create_contractor(draft).await;
        let contractor = self.settle(Action::Create, result)?;
        self.contractors.push(contractor.clone());
        Ok(contractor)
    }

    pub async fn update_contractor(&mut self, mut contractor: Contractor) -> Result<Contractor> {
        contractor.dedup_projects();
        contractor.validate()?;
        let result = self.backend.update_contractor(&contractor).await;
        let updated = self.settle(Action::Update, result)?;
        upsert(&mut self.contractors, updated.clone());
        Ok(updated)
    }

    /// Delete a contractor and every claim it raised
    pub async fn delete_contractor(&mut self, id: &str) -> Result<Option<CascadeOutcome>> {
        let Some(contractor) = self.contractor(id).cloned() else {
            debug!("Contractor {} not loaded, nothing to delete", id);
            return Ok(None);
        };

        let result = match self.backend.cascade_authority() {
            CascadeAuthority::Client => {
                let plan = CascadePlan::for_contractor(contractor.id.as_str(), &self.claims);
                self.apply_cascade(Parent::Contractor, &contractor.id, plan)
                    .await
            }
            CascadeAuthority::Server => {
                self.delete_with_server_cascade(Parent::Contractor, &contractor.id)
                    .await
            }
        };
        let outcome = self.fail_on_err::<Contractor, _>(Action::Delete, result)?;

        self.deleted::<Contractor>(format!(
            "{} and all associated claims have been deleted.",
            contractor.name
        ));
        Ok(Some(outcome))
    }

    // =====================================================================
    // Claims
    // =====================================================================

    pub async fn add_claim(&mut self, draft: ClaimDraft) -> Result<Claim> {
        draft.validate()?;
        let result = self.backend.create_claim(draft).await;
        let claim = self.settle(Action::Create, result)?;
        self.claims.push(claim.clone());
        Ok(claim)
    }

    pub async fn update_claim(&mut self, claim: Claim) -> Result<Claim> {
        claim.validate()?;
        let result = self.backend.update_claim(&claim).await;
        let updated = self.settle(Action::Update, result)?;
        upsert(&mut self.claims, updated.clone());
        Ok(updated)
    }

    pub async fn delete_claim(&mut self, id: &str) -> Result<Option<Claim>> {
        let Some(claim) = self.claim(id).cloned() else {
            debug!("Claim {} not loaded, nothing to delete", id);
            return Ok(None);
        };

        let result = self.backend.delete_claim(&claim.id).await;
        self.fail_on_err::<Claim, _>(Action::Delete, result)?;
        self.claims.retain(|c| c.id != claim.id);

        self.deleted::<Claim>(format!("{} has been deleted successfully.", claim.title));
        Ok(Some(claim))
    }

    // =====================================================================
    // Cascade
    // =====================================================================

    /// Delete the parent, then persist each dependent change in order:
    /// contractor updates, contractor deletions, claim deletions
    ///
    /// Memory follows the backend step by step, so a failure part way
    /// through leaves the store matching what was actually persisted. Any
    /// failure after the parent is gone comes back as `PartialCascade`.
    async fn apply_cascade(
        &mut self,
        kind: Parent,
        parent: &EntityId,
        plan: CascadePlan,
    ) -> Result<CascadeOutcome> {
        self.delete_parent(kind, parent).await?;

        let mut outcome = CascadeOutcome::new(parent.clone());
        if let Err(e) = self.apply_dependents(plan, &mut outcome).await {
            warn!("Cascade from {} stopped part way: {:?}", parent, outcome);
            return Err(StoreError::PartialCascade {
                parent: parent.clone(),
                outcome: Box::new(outcome),
                source: Box::new(e),
            });
        }

        debug!("Cascade from {} applied: {:?}", parent, outcome);
        Ok(outcome)
    }

    async fn apply_dependents(
        &mut self,
        plan: CascadePlan,
        outcome: &mut CascadeOutcome,
    ) -> Result<()> {
        for mut contractor in plan.contractors_to_update {
            contractor.dedup_projects();
            let updated = self.backend.update_contractor(&contractor).await?;
            outcome.contractors_updated.push(updated.id.clone());
            upsert(&mut self.contractors, updated);
        }

        for id in plan.contractors_to_delete {
            self.backend.delete_contractor(&id).await?;
            self.contractors.retain(|c| c.id != id);
            outcome.contractors_deleted.push(id);
        }

        for id in plan.claims_to_delete {
            self.backend.delete_claim(&id).await?;
            self.claims.retain(|c| c.id != id);
            outcome.claims_deleted.push(id);
        }

        Ok(())
    }

    /// Delete the parent and re-read the dependents the server cascaded
    async fn delete_with_server_cascade(
        &mut self,
        kind: Parent,
        parent: &EntityId,
    ) -> Result<CascadeOutcome> {
        self.delete_parent(kind, parent).await?;

        let backend = self.backend.as_ref();
        let (contractors, claims) =
            tokio::join!(backend.list_contractors(), backend.list_claims());

        let mut refreshed = true;
        let contractors = match contractors {
            Ok(contractors) => contractors,
            Err(e) => {
                warn!("Failed to reload contractors after deleting {}: {}", parent, e);
                refreshed = false;
                self.contractors.clone()
            }
        };
        let claims = match claims {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Failed to reload claims after deleting {}: {}", parent, e);
                refreshed = false;
                self.claims.clone()
            }
        };

        let mut outcome = CascadeOutcome::from_diff(
            parent.clone(),
            &self.contractors,
            &contractors,
            &self.claims,
            &claims,
        );
        outcome.dependents_refreshed = refreshed;

        self.contractors = contractors;
        self.claims = claims;
        Ok(outcome)
    }

    async fn delete_parent(&mut self, kind: Parent, id: &EntityId) -> Result<()> {
        match kind {
            Parent::Project => {
                self.backend.delete_project(id).await?;
                self.projects.retain(|p| &p.id != id);
            }
            Parent::Contractor => {
                self.backend.delete_contractor(id).await?;
                self.contractors.retain(|c| &c.id != id);
            }
        }
        Ok(())
    }

    // =====================================================================
    // Notifications
    // =====================================================================

    /// Pass a create/update result through, announcing the outcome
    fn settle<T: Entity>(&self, action: Action, result: Result<T>) -> Result<T> {
        let record = self.fail_on_err::<T, _>(action, result)?;
        self.notifier.notify(Notification::success(
            format!("{} {}", title_case(T::KIND), action.past()),
            format!("{} has been {} successfully.", record.title(), action.past()),
        ));
        Ok(record)
    }

    /// Log and announce a failed mutation; validation failures are left to
    /// the caller to render field by field
    fn fail_on_err<T: Entity, R>(&self, action: Action, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            if !matches!(e, StoreError::Invalid(_)) {
                error!("Failed to {} {}: {}", action.verb(), T::KIND, e);
                self.notifier.notify(Notification::error(
                    format!("Failed to {} {}", action.verb(), T::KIND),
                    e.user_message(),
                ));
            }
        }
        result
    }

    fn deleted<T: Entity>(&self, description: String) {
        self.notifier.notify(Notification::success(
            format!("{} {}", title_case(T::KIND), Action::Delete.past()),
            description,
        ));
    }
}

/// Replace the record with the same id, or append it
fn upsert<T: Entity>(items: &mut Vec<T>, record: T) {
    match items.iter_mut().find(|item| item.id() == record.id()) {
        Some(slot) => *slot = record,
        None => items.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Level, MemoryNotifier};
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    fn local_store() -> (Store, Arc<MemoryNotifier>, TempDir) {
        let tmp = tempdir().unwrap();
        let notifier = Arc::new(MemoryNotifier::new());
        let store = Store::new(LocalBackend::new(tmp.path()), notifier.clone());
        (store, notifier, tmp)
    }

    #[tokio::test]
    async fn test_add_notifies_and_is_visible() {
        let (mut store, notifier, _tmp) = local_store();

        let country = store.add_country(CountryDraft::new("Kenya")).await.unwrap();

        assert_eq!(store.country(country.id.as_str()), Some(&country));
        let last = notifier.last().unwrap();
        assert_eq!(last.level, Level::Success);
        assert_eq!(last.title, "Country created");
        assert_eq!(last.description, "Kenya has been created successfully.");
    }

    #[tokio::test]
    async fn test_invalid_draft_does_not_notify() {
        let (mut store, notifier, _tmp) = local_store();

        let err = store
            .add_project(ProjectDraft::new("Highway A", None))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(notifier.all().is_empty());
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_notifies_error() {
        let (mut store, notifier, _tmp) = local_store();
        let ghost = CountryDraft::new("Ghost")
            .into_record(EntityId::new(Country::PREFIX), chrono::Utc::now());

        assert!(store.update_country(ghost).await.is_err());

        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].title, "Failed to update country");
        assert!(store.countries().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_reloads_from_backend() {
        let tmp = tempdir().unwrap();
        {
            let mut store = Store::new(LocalBackend::new(tmp.path()), MemoryNotifier::new());
            store.add_country(CountryDraft::new("Kenya")).await.unwrap();
        }

        let mut store = Store::new(LocalBackend::new(tmp.path()), MemoryNotifier::new());
        assert!(store.countries().is_empty());
        let report = store.refresh().await;

        assert!(report.is_complete());
        assert_eq!(store.dashboard().countries, 1);
    }
}
