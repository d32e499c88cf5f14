//! Contractor entity type - firms engaged on one or more projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::ValidationErrors;
use crate::entities::attachment::{self, Attachment};

/// A Contractor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    /// Unique identifier
    pub id: EntityId,

    /// Company name
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Projects this contractor works on (the many-to-many edge)
    #[serde(default)]
    pub project_ids: Vec<EntityId>,

    /// Context files
    #[serde(default)]
    pub context_files: Vec<Attachment>,
}

impl Entity for Contractor {
    const PREFIX: EntityPrefix = EntityPrefix::Ctr;
    const KIND: &'static str = "contractor";
    const KIND_PLURAL: &'static str = "contractors";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Contractor {
    /// Is this contractor engaged on the given project?
    pub fn works_on(&self, project_id: &str) -> bool {
        self.project_ids.iter().any(|p| p.as_str() == project_id)
    }

    /// True when the given project is the only one on the list
    pub fn works_only_on(&self, project_id: &str) -> bool {
        !self.project_ids.is_empty() && self.project_ids.iter().all(|p| p.as_str() == project_id)
    }

    /// Drop repeated project ids, keeping first occurrences in order
    pub fn dedup_projects(&mut self) {
        dedup(&mut self.project_ids);
    }

    /// Copy of this contractor with a project removed from its list
    pub fn without_project(&self, project_id: &str) -> Contractor {
        let mut updated = self.clone();
        updated.project_ids.retain(|p| p.as_str() != project_id);
        updated
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.name, &self.project_ids)
    }
}

/// User-supplied fields for a new contractor
#[derive(Debug, Clone, Default)]
pub struct ContractorDraft {
    pub name: String,
    pub project_ids: Vec<EntityId>,
    pub context_files: Vec<PathBuf>,
}

impl ContractorDraft {
    pub fn new(name: impl Into<String>, project_ids: Vec<EntityId>) -> Self {
        Self {
            name: name.into(),
            project_ids,
            context_files: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.name, &self.project_ids)
    }

    pub fn into_record(self, id: EntityId, created_at: DateTime<Utc>) -> Contractor {
        let mut project_ids = self.project_ids;
        dedup(&mut project_ids);
        Contractor {
            id,
            name: self.name.trim().to_string(),
            created_at,
            project_ids,
            context_files: attachment::from_paths(&self.context_files),
        }
    }
}

fn dedup(project_ids: &mut Vec<EntityId>) {
    let mut seen = std::collections::HashSet::new();
    project_ids.retain(|p| seen.insert(p.clone()));
}

fn validate_fields(name: &str, project_ids: &[EntityId]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(name.trim().is_empty(), "name", "Contractor name is required");
    errors.check(
        project_ids.is_empty(),
        "project",
        "At least one project must be selected",
    );
    errors.into_result()
}
