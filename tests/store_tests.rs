//! Store behavior against the local backend: cascades, lookups and
//! notifications

use std::sync::Arc;

use async_trait::async_trait;
use claimdesk::core::EntityId;
use claimdesk::entities::{
    Claim, ClaimDraft, Contractor, ContractorDraft, Country, CountryDraft, Project, ProjectDraft,
};
use claimdesk::notify::{Level, MemoryNotifier};
use claimdesk::store::{
    Backend, CascadeAuthority, DanglingRef, LocalBackend, LocalStoreError, Store, StoreError,
};
use tempfile::TempDir;

type BackendResult<T> = Result<T, StoreError>;

struct Fixture {
    store: Store,
    notifier: Arc<MemoryNotifier>,
    tmp: TempDir,
}

fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let notifier = Arc::new(MemoryNotifier::new());
    let store = Store::new(LocalBackend::new(tmp.path()), notifier.clone());
    Fixture {
        store,
        notifier,
        tmp,
    }
}

/// Kenya, Highway A and Bridge B; BuildCo works on both, RoadWorks only on
/// Highway A; Delay-1 is RoadWorks' claim on Highway A, Delay-2 is BuildCo's
/// claim on Bridge B
struct Seeded {
    country: EntityId,
    highway: EntityId,
    bridge: EntityId,
    buildco: EntityId,
    roadworks: EntityId,
    delay_1: EntityId,
    delay_2: EntityId,
}

async fn seed(store: &mut Store) -> Seeded {
    let country = store.add_country(CountryDraft::new("Kenya")).await.unwrap().id;
    let highway = store
        .add_project(ProjectDraft::new("Highway A", Some(country.clone())))
        .await
        .unwrap()
        .id;
    let bridge = store
        .add_project(ProjectDraft::new("Bridge B", Some(country.clone())))
        .await
        .unwrap()
        .id;
    let buildco = store
        .add_contractor(ContractorDraft::new(
            "BuildCo",
            vec![highway.clone(), bridge.clone()],
        ))
        .await
        .unwrap()
        .id;
    let roadworks = store
        .add_contractor(ContractorDraft::new("RoadWorks", vec![highway.clone()]))
        .await
        .unwrap()
        .id;
    let delay_1 = store
        .add_claim(
            ClaimDraft::new("Delay-1")
                .against(highway.clone(), roadworks.clone())
                .with_claim_file("claims/delay-1.pdf"),
        )
        .await
        .unwrap()
        .id;
    let delay_2 = store
        .add_claim(
            ClaimDraft::new("Delay-2")
                .against(bridge.clone(), buildco.clone())
                .with_claim_file("claims/delay-2.pdf"),
        )
        .await
        .unwrap()
        .id;

    Seeded {
        country,
        highway,
        bridge,
        buildco,
        roadworks,
        delay_1,
        delay_2,
    }
}

#[tokio::test]
async fn test_add_then_lookup() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let highway = fx.store.project(s.highway.as_str()).unwrap();
    assert_eq!(highway.title, "Highway A");
    assert_eq!(highway.country_id.as_ref(), Some(&s.country));

    let dashboard = fx.store.dashboard();
    assert_eq!(dashboard.countries, 1);
    assert_eq!(dashboard.projects, 2);
    assert_eq!(dashboard.contractors, 2);
    assert_eq!(dashboard.claims, 2);
}

#[tokio::test]
async fn test_relation_lookups() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let names: Vec<&str> = fx
        .store
        .contractors_for_project(s.highway.as_str())
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["BuildCo", "RoadWorks"]);

    assert_eq!(fx.store.projects_for_contractor(s.buildco.as_str()).len(), 2);
    assert_eq!(fx.store.projects_for_country(s.country.as_str()).len(), 2);
    assert_eq!(fx.store.claims_for_contractor(s.roadworks.as_str()).len(), 1);
    assert!(fx.store.claims_for_project("PROJ-UNKNOWN").is_empty());
}

#[tokio::test]
async fn test_delete_project_cascades() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let outcome = fx
        .store
        .delete_project(s.highway.as_str())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.deleted, s.highway);
    assert_eq!(outcome.contractors_updated, vec![s.buildco.clone()]);
    assert_eq!(outcome.contractors_deleted, vec![s.roadworks.clone()]);
    assert_eq!(outcome.claims_deleted, vec![s.delay_1.clone()]);
    assert!(outcome.dependents_refreshed);

    assert!(fx.store.project(s.highway.as_str()).is_none());
    assert!(fx.store.contractor(s.roadworks.as_str()).is_none());
    assert!(fx.store.claim(s.delay_1.as_str()).is_none());
    let buildco = fx.store.contractor(s.buildco.as_str()).unwrap();
    assert_eq!(buildco.project_ids, vec![s.bridge.clone()]);
    assert!(fx.store.claim(s.delay_2.as_str()).is_some());

    let last = fx.notifier.last().unwrap();
    assert_eq!(last.level, Level::Success);
    assert_eq!(last.title, "Project deleted");
    assert_eq!(
        last.description,
        "Highway A and all associated content has been deleted."
    );
}

#[tokio::test]
async fn test_cascade_is_persisted() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;
    fx.store.delete_project(s.highway.as_str()).await.unwrap();

    let mut reopened = Store::new(LocalBackend::new(fx.tmp.path()), MemoryNotifier::new());
    let report = reopened.refresh().await;

    assert!(report.is_complete());
    assert_eq!(reopened.projects().len(), 1);
    assert_eq!(reopened.contractors().len(), 1);
    assert_eq!(reopened.claims().len(), 1);
    assert!(reopened.check_references().is_empty());
}

#[tokio::test]
async fn test_delete_contractor_removes_its_claims() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let outcome = fx
        .store
        .delete_contractor(s.buildco.as_str())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.claims_deleted, vec![s.delay_2.clone()]);
    assert!(outcome.contractors_updated.is_empty());
    assert!(fx.store.claims_for_project(s.bridge.as_str()).is_empty());
    assert_eq!(fx.store.claims().len(), 1);
    assert_eq!(
        fx.notifier.last().unwrap().description,
        "BuildCo and all associated claims have been deleted."
    );
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    assert!(fx.store.delete_claim(s.delay_1.as_str()).await.unwrap().is_some());
    let seen = fx.notifier.all().len();

    assert!(fx.store.delete_claim(s.delay_1.as_str()).await.unwrap().is_none());
    assert!(fx
        .store
        .delete_project("PROJ-UNKNOWN")
        .await
        .unwrap()
        .is_none());
    assert_eq!(fx.notifier.all().len(), seen);
}

#[tokio::test]
async fn test_delete_country_leaves_projects_dangling() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let deleted = fx
        .store
        .delete_country(s.country.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.name, "Kenya");
    assert_eq!(
        fx.notifier.last().unwrap().description,
        "Kenya has been deleted successfully."
    );

    assert_eq!(fx.store.projects().len(), 2);
    let dangling = fx.store.check_references();
    assert_eq!(dangling.len(), 2);
    assert!(dangling
        .iter()
        .all(|d| matches!(d, DanglingRef::ProjectCountry { .. })));
}

#[tokio::test]
async fn test_update_replaces_record() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let mut claim = fx.store.claim(s.delay_1.as_str()).unwrap().clone();
    claim.title = "Delay-1 (revised)".to_string();
    let updated = fx.store.update_claim(claim).await.unwrap();

    assert_eq!(updated.title, "Delay-1 (revised)");
    assert_eq!(fx.store.claims().len(), 2);
    assert_eq!(
        fx.store.claim(s.delay_1.as_str()).unwrap().title,
        "Delay-1 (revised)"
    );
    let last = fx.notifier.last().unwrap();
    assert_eq!(last.title, "Claim updated");
    assert_eq!(
        last.description,
        "Delay-1 (revised) has been updated successfully."
    );
}

#[tokio::test]
async fn test_repeated_project_on_contractor_still_cascades() {
    let mut fx = fixture();
    let s = seed(&mut fx.store).await;

    let mut roadworks = fx.store.contractor(s.roadworks.as_str()).unwrap().clone();
    roadworks.project_ids = vec![s.highway.clone(), s.highway.clone()];
    let updated = fx.store.update_contractor(roadworks.clone()).await.unwrap();
    assert_eq!(updated.project_ids, vec![s.highway.clone()]);

    // Written straight to the file, bypassing the store's normalization
    LocalBackend::new(fx.tmp.path())
        .update_contractor(&roadworks)
        .await
        .unwrap();
    let mut store = Store::new(LocalBackend::new(fx.tmp.path()), fx.notifier.clone());
    assert!(store.refresh().await.is_complete());

    let outcome = store
        .delete_project(s.highway.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.contractors_deleted, vec![s.roadworks.clone()]);
    assert_eq!(outcome.contractors_updated, vec![s.buildco.clone()]);
    assert!(store.contractor(s.roadworks.as_str()).is_none());
    assert_eq!(fx.notifier.last().unwrap().level, Level::Success);
}

/// Local backend whose claim deletions always fail
struct ClaimDeletesFail {
    inner: LocalBackend,
}

#[async_trait]
impl Backend for ClaimDeletesFail {
    fn cascade_authority(&self) -> CascadeAuthority {
        CascadeAuthority::Client
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    async fn list_countries(&self) -> BackendResult<Vec<Country>> {
        self.inner.list_countries().await
    }
    async fn create_country(&self, draft: CountryDraft) -> BackendResult<Country> {
        self.inner.create_country(draft).await
    }
    async fn update_country(&self, country: &Country) -> BackendResult<Country> {
        self.inner.update_country(country).await
    }
    async fn delete_country(&self, id: &EntityId) -> BackendResult<()> {
        self.inner.delete_country(id).await
    }

    async fn list_projects(&self) -> BackendResult<Vec<Project>> {
        self.inner.list_projects().await
    }
    async fn create_project(&self, draft: ProjectDraft) -> BackendResult<Project> {
        self.inner.create_project(draft).await
    }
    async fn update_project(&self, project: &Project) -> BackendResult<Project> {
        self.inner.update_project(project).await
    }
    async fn delete_project(&self, id: &EntityId) -> BackendResult<()> {
        self.inner.delete_project(id).await
    }

    async fn list_contractors(&self) -> BackendResult<Vec<Contractor>> {
        self.inner.list_contractors().await
    }
    async fn create_contractor(&self, draft: ContractorDraft) -> BackendResult<Contractor> {
        self.inner.create_contractor(draft).await
    }
    async fn update_contractor(&self, contractor: &Contractor) -> BackendResult<Contractor> {
        self.inner.update_contractor(contractor).await
    }
    async fn delete_contractor(&self, id: &EntityId) -> BackendResult<()> {
        self.inner.delete_contractor(id).await
    }

    async fn list_claims(&self) -> BackendResult<Vec<Claim>> {
        self.inner.list_claims().await
    }
    async fn create_claim(&self, draft: ClaimDraft) -> BackendResult<Claim> {
        self.inner.create_claim(draft).await
    }
    async fn update_claim(&self, claim: &Claim) -> BackendResult<Claim> {
        self.inner.update_claim(claim).await
    }
    async fn delete_claim(&self, id: &EntityId) -> BackendResult<()> {
        Err(LocalStoreError::NotFound {
            kind: "claim",
            id: id.to_string(),
        }
        .into())
    }
}

#[tokio::test]
async fn test_cascade_failing_after_parent_delete_is_reported() {
    let tmp = TempDir::new().unwrap();
    let notifier = Arc::new(MemoryNotifier::new());
    let backend = ClaimDeletesFail {
        inner: LocalBackend::new(tmp.path()),
    };
    let mut store = Store::new(backend, notifier.clone());
    let s = seed(&mut store).await;

    let err = store.delete_project(s.highway.as_str()).await.unwrap_err();
    let StoreError::PartialCascade {
        parent, outcome, ..
    } = &err
    else {
        panic!("expected a partial cascade, got {err:?}");
    };
    assert_eq!(parent, &s.highway);
    assert_eq!(outcome.contractors_updated, vec![s.buildco.clone()]);
    assert_eq!(outcome.contractors_deleted, vec![s.roadworks.clone()]);
    assert!(outcome.claims_deleted.is_empty());

    // Memory holds exactly the steps that persisted
    assert!(store.project(s.highway.as_str()).is_none());
    assert!(store.contractor(s.roadworks.as_str()).is_none());
    assert_eq!(
        store.contractor(s.buildco.as_str()).unwrap().project_ids,
        vec![s.bridge.clone()]
    );
    assert!(store.claim(s.delay_1.as_str()).is_some());

    let mut reopened = Store::new(LocalBackend::new(tmp.path()), MemoryNotifier::new());
    assert!(reopened.refresh().await.is_complete());
    assert_eq!(reopened.projects(), store.projects());
    assert_eq!(reopened.contractors(), store.contractors());
    assert_eq!(reopened.claims(), store.claims());

    let last = notifier.last().unwrap();
    assert_eq!(last.level, Level::Error);
    assert_eq!(last.title, "Failed to delete project");
    assert!(last
        .description
        .contains("was deleted but its dependents were only partly updated"));
}
