//! Dangling-reference detection
//!
//! Deleting a country never cascades, so projects can end up pointing at a
//! country that no longer exists. The same can happen with any backend whose
//! data was edited out of band.

use std::fmt;

use crate::core::identity::EntityId;
use crate::entities::{Claim, Contractor, Country, Project};

/// A reference to a record that does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingRef {
    ProjectCountry { project: EntityId, country: EntityId },
    ContractorProject { contractor: EntityId, project: EntityId },
    ClaimProject { claim: EntityId, project: EntityId },
    ClaimContractor { claim: EntityId, contractor: EntityId },
}

impl DanglingRef {
    /// The record holding the broken reference
    pub fn source(&self) -> &EntityId {
        match self {
            Self::ProjectCountry { project, .. } => project,
            Self::ContractorProject { contractor, .. } => contractor,
            Self::ClaimProject { claim, .. } | Self::ClaimContractor { claim, .. } => claim,
        }
    }

    /// The id that could not be found
    pub fn target(&self) -> &EntityId {
        match self {
            Self::ProjectCountry { country, .. } => country,
            Self::ContractorProject { project, .. } | Self::ClaimProject { project, .. } => project,
            Self::ClaimContractor { contractor, .. } => contractor,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::ProjectCountry { .. } => "country",
            Self::ContractorProject { .. } => "projects",
            Self::ClaimProject { .. } => "project",
            Self::ClaimContractor { .. } => "contractor",
        }
    }
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} {} (missing)",
            self.source(),
            self.field(),
            self.target()
        )
    }
}

pub fn dangling_references(
    countries: &[Country],
    projects: &[Project],
    contractors: &[Contractor],
    claims: &[Claim],
) -> Vec<DanglingRef> {
    let country_exists = |id: &EntityId| countries.iter().any(|c| &c.id == id);
    let project_exists = |id: &EntityId| projects.iter().any(|p| &p.id == id);
    let contractor_exists = |id: &EntityId| contractors.iter().any(|c| &c.id == id);

    let mut found = Vec::new();

    for project in projects {
        if let Some(country) = project.country_id.as_ref().filter(|c| !country_exists(c)) {
            found.push(DanglingRef::ProjectCountry {
                project: project.id.clone(),
                country: country.clone(),
            });
        }
    }

    for contractor in contractors {
        for project in contractor.project_ids.iter().filter(|p| !project_exists(p)) {
            found.push(DanglingRef::ContractorProject {
                contractor: contractor.id.clone(),
                project: project.clone(),
            });
        }
    }

    for claim in claims {
        if !project_exists(&claim.project_id) {
            found.push(DanglingRef::ClaimProject {
                claim: claim.id.clone(),
                project: claim.project_id.clone(),
            });
        }
        if !contractor_exists(&claim.contractor_id) {
            found.push(DanglingRef::ClaimContractor {
                claim: claim.id.clone(),
                contractor: claim.contractor_id.clone(),
            });
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ProjectDraft, CountryDraft};
    use chrono::Utc;

    fn id(s: &str) -> EntityId {
        EntityId::from(s.to_string())
    }

    #[test]
    fn test_project_pointing_at_deleted_country() {
        let countries = vec![CountryDraft::new("Kenya").into_record(id("C1"), Utc::now())];
        let projects = vec![
            ProjectDraft::new("Highway A", Some(id("C1"))).into_record(id("P1"), Utc::now()),
            ProjectDraft::new("Bridge", Some(id("C2"))).into_record(id("P2"), Utc::now()),
        ];

        let found = dangling_references(&countries, &projects, &[], &[]);

        assert_eq!(
            found,
            vec![DanglingRef::ProjectCountry {
                project: id("P2"),
                country: id("C2"),
            }]
        );
        assert_eq!(found[0].to_string(), "P2 -> country C2 (missing)");
    }

    #[test]
    fn test_consistent_data_has_no_findings() {
        assert!(dangling_references(&[], &[], &[], &[]).is_empty());
    }
}
