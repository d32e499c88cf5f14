//! Project entity type - work sites contractors are engaged on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::ValidationErrors;
use crate::entities::attachment::{self, Attachment};

/// A Project record
///
/// Projects hold no list of contractors. The many-to-many edge lives on the
/// contractor side and is found by scanning contractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: EntityId,

    /// Project title
    pub title: String,

    /// Country the project is located in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<EntityId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Context files
    #[serde(default)]
    pub context_files: Vec<Attachment>,
}

impl Entity for Project {
    const PREFIX: EntityPrefix = EntityPrefix::Proj;
    const KIND: &'static str = "project";
    const KIND_PLURAL: &'static str = "projects";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// User-supplied fields for a new project
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub country_id: Option<EntityId>,
    pub context_files: Vec<PathBuf>,
}

impl ProjectDraft {
    pub fn new(title: impl Into<String>, country_id: Option<EntityId>) -> Self {
        Self {
            title: title.into(),
            country_id,
            context_files: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.title, self.country_id.as_ref())
    }

    pub fn into_record(self, id: EntityId, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            title: self.title.trim().to_string(),
            country_id: self.country_id,
            created_at,
            context_files: attachment::from_paths(&self.context_files),
        }
    }
}

impl Project {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.title, self.country_id.as_ref())
    }
}

fn validate_fields(title: &str, country_id: Option<&EntityId>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(title.trim().is_empty(), "title", "Project title is required");
    errors.check(country_id.is_none(), "country", "A country must be selected");
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_title_and_country() {
        let errors = ProjectDraft::new("", None).validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message_for("title"), Some("Project title is required"));
        assert_eq!(
            errors.message_for("country"),
            Some("A country must be selected")
        );
    }

    #[test]
    fn test_valid_draft() {
        let country = EntityId::new(EntityPrefix::Ctry);
        let draft = ProjectDraft::new("Highway A", Some(country.clone()));
        assert!(draft.validate().is_ok());

        let project = draft.into_record(EntityId::new(EntityPrefix::Proj), Utc::now());
        assert_eq!(project.country_id, Some(country));
    }

    #[test]
    fn test_serializes_camel_case() {
        let project = ProjectDraft::new("Bridge", None)
            .into_record(EntityId::from("PROJ-1".to_string()), Utc::now());
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("contextFiles").is_some());
        assert!(json.get("countryId").is_none());
    }
}
