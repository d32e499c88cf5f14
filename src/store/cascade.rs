//! Cascade planning for project and contractor deletion
//!
//! Deleting a project:
//! - contractors working only on it are deleted
//! - contractors also working elsewhere lose it from their project list
//! - claims raised against it are deleted
//!
//! Deleting a contractor deletes every claim it raised. Deleting a country or
//! a claim has no dependents.

use crate::core::identity::EntityId;
use crate::entities::{Claim, Contractor};

/// The dependent changes a deletion implies, computed from a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadePlan {
    /// Contractors to persist with the parent removed from their project list
    pub contractors_to_update: Vec<Contractor>,
    pub contractors_to_delete: Vec<EntityId>,
    pub claims_to_delete: Vec<EntityId>,
}

impl CascadePlan {
    pub fn for_project(project_id: &str, contractors: &[Contractor], claims: &[Claim]) -> Self {
        let mut plan = Self::default();

        for contractor in contractors.iter().filter(|c| c.works_on(project_id)) {
            if contractor.works_only_on(project_id) {
                plan.contractors_to_delete.push(contractor.id.clone());
            } else {
                plan.contractors_to_update
                    .push(contractor.without_project(project_id));
            }
        }

        plan.claims_to_delete = claims
            .iter()
            .filter(|c| c.project_id.as_str() == project_id)
            .map(|c| c.id.clone())
            .collect();

        plan
    }

    pub fn for_contractor(contractor_id: &str, claims: &[Claim]) -> Self {
        Self {
            claims_to_delete: claims
                .iter()
                .filter(|c| c.contractor_id.as_str() == contractor_id)
                .map(|c| c.id.clone())
                .collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contractors_to_update.is_empty()
            && self.contractors_to_delete.is_empty()
            && self.claims_to_delete.is_empty()
    }
}

/// What a project or contractor deletion actually changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub deleted: EntityId,
    pub contractors_updated: Vec<EntityId>,
    pub contractors_deleted: Vec<EntityId>,
    pub claims_deleted: Vec<EntityId>,
    /// False when the server cascaded but dependents could not be re-read
    pub dependents_refreshed: bool,
}

impl CascadeOutcome {
    pub(crate) fn new(deleted: EntityId) -> Self {
        Self {
            deleted,
            contractors_updated: Vec::new(),
            contractors_deleted: Vec::new(),
            claims_deleted: Vec::new(),
            dependents_refreshed: true,
        }
    }

    /// Derive the outcome by comparing dependents before and after the
    /// server performed the cascade
    pub(crate) fn from_diff(
        deleted: EntityId,
        contractors_before: &[Contractor],
        contractors_after: &[Contractor],
        claims_before: &[Claim],
        claims_after: &[Claim],
    ) -> Self {
        let mut outcome = Self::new(deleted);

        for before in contractors_before {
            match contractors_after.iter().find(|c| c.id == before.id) {
                None => outcome.contractors_deleted.push(before.id.clone()),
                Some(after) if after.project_ids != before.project_ids => {
                    outcome.contractors_updated.push(before.id.clone())
                }
                Some(_) => {}
            }
        }

        outcome.claims_deleted = claims_before
            .iter()
            .filter(|c| !claims_after.iter().any(|a| a.id == c.id))
            .map(|c| c.id.clone())
            .collect();

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClaimDraft, ContractorDraft};
    use chrono::Utc;

    fn id(s: &str) -> EntityId {
        EntityId::from(s.to_string())
    }

    fn contractor(name: &str, projects: &[&str]) -> Contractor {
        ContractorDraft::new(name, projects.iter().map(|p| id(p)).collect())
            .into_record(id(name), Utc::now())
    }

    fn claim(name: &str, project: &str, contractor: &str) -> Claim {
        ClaimDraft::new(name)
            .against(id(project), id(contractor))
            .with_claim_file("claim.pdf")
            .into_record(id(name), Utc::now())
            .unwrap()
    }

    #[test]
    fn test_project_cascade_splits_contractors() {
        let contractors = vec![
            contractor("BuildCo", &["P1", "P2"]),
            contractor("RoadWorks", &["P1"]),
            contractor("Elsewhere", &["P2"]),
        ];
        let claims = vec![
            claim("Delay-1", "P1", "BuildCo"),
            claim("Other", "P2", "Elsewhere"),
        ];

        let plan = CascadePlan::for_project("P1", &contractors, &claims);

        assert_eq!(plan.contractors_to_delete, vec![id("RoadWorks")]);
        assert_eq!(plan.contractors_to_update.len(), 1);
        assert_eq!(plan.contractors_to_update[0].id, id("BuildCo"));
        assert_eq!(plan.contractors_to_update[0].project_ids, vec![id("P2")]);
        assert_eq!(plan.claims_to_delete, vec![id("Delay-1")]);
    }

    #[test]
    fn test_project_without_dependents_has_empty_plan() {
        let contractors = vec![contractor("Elsewhere", &["P2"])];
        assert!(CascadePlan::for_project("P1", &contractors, &[]).is_empty());
    }

    #[test]
    fn test_contractor_cascade_takes_only_its_claims() {
        let claims = vec![
            claim("A", "P1", "BuildCo"),
            claim("B", "P2", "BuildCo"),
            claim("C", "P1", "RoadWorks"),
        ];
        let plan = CascadePlan::for_contractor("BuildCo", &claims);
        assert_eq!(plan.claims_to_delete, vec![id("A"), id("B")]);
        assert!(plan.contractors_to_delete.is_empty());
    }

    #[test]
    fn test_outcome_from_diff() {
        let before = vec![
            contractor("BuildCo", &["P1", "P2"]),
            contractor("RoadWorks", &["P1"]),
        ];
        let after = vec![contractor("BuildCo", &["P2"])];
        let claims_before = vec![claim("Delay-1", "P1", "BuildCo")];

        let outcome = CascadeOutcome::from_diff(id("P1"), &before, &after, &claims_before, &[]);

        assert_eq!(outcome.contractors_updated, vec![id("BuildCo")]);
        assert_eq!(outcome.contractors_deleted, vec![id("RoadWorks")]);
        assert_eq!(outcome.claims_deleted, vec![id("Delay-1")]);
        assert!(outcome.dependents_refreshed);
    }
}
