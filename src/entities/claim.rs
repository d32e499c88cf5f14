//! Claim entity type - a contractor's claim against a project

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::ValidationErrors;
use crate::entities::attachment::{self, Attachment};

/// A Claim record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Unique identifier
    pub id: EntityId,

    /// Claim title
    pub title: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Contractor raising the claim
    pub contractor_id: EntityId,

    /// Project the claim is raised against
    pub project_id: EntityId,

    /// Primary claim document
    ///
    /// Always present on locally created claims. The REST backend does not
    /// echo it back, so claims loaded from the server may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_file: Option<Attachment>,

    /// Supporting files
    #[serde(default)]
    pub context_files: Vec<Attachment>,

    /// Whether the project's context files were included
    #[serde(default)]
    pub included_project_context: bool,

    /// Whether the contractor's context files were included
    #[serde(default)]
    pub included_contractor_context: bool,
}

impl Entity for Claim {
    const PREFIX: EntityPrefix = EntityPrefix::Clm;
    const KIND: &'static str = "claim";
    const KIND_PLURAL: &'static str = "claims";

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

impl Claim {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.trim().is_empty(), "title", "Claim title is required");
        errors.into_result()
    }
}

/// User-supplied fields for a new claim
#[derive(Debug, Clone, Default)]
pub struct ClaimDraft {
    pub title: String,
    pub contractor_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    pub claim_file: Option<PathBuf>,
    pub context_files: Vec<PathBuf>,
    pub included_project_context: bool,
    pub included_contractor_context: bool,
}

impl ClaimDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn against(mut self, project_id: EntityId, contractor_id: EntityId) -> Self {
        self.project_id = Some(project_id);
        self.contractor_id = Some(contractor_id);
        self
    }

    pub fn with_claim_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.claim_file = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.trim().is_empty(), "title", "Claim title is required");
        errors.check(
            self.contractor_id.is_none(),
            "contractor",
            "A contractor must be selected",
        );
        errors.check(self.project_id.is_none(), "project", "A project must be selected");
        errors.check(
            self.claim_file.is_none(),
            "claim-file",
            "A claim file must be uploaded",
        );
        errors.into_result()
    }

    /// Required relations and the claim file, once validation passes
    pub fn required(&self) -> Result<(&EntityId, &EntityId, &PathBuf), ValidationErrors> {
        self.validate()?;
        match (&self.contractor_id, &self.project_id, &self.claim_file) {
            (Some(contractor), Some(project), Some(file)) => Ok((contractor, project, file)),
            _ => Err(ValidationErrors::new()),
        }
    }

    /// Materialize the draft as a record
    ///
    /// Returns the validation errors when required fields are missing.
    pub fn into_record(
        self,
        id: EntityId,
        created_at: DateTime<Utc>,
    ) -> Result<Claim, ValidationErrors> {
        let (contractor_id, project_id, claim_file) = {
            let (c, p, f) = self.required()?;
            (c.clone(), p.clone(), Attachment::from_path(f))
        };

        Ok(Claim {
            id,
            title: self.title.trim().to_string(),
            created_at,
            contractor_id,
            project_id,
            claim_file: Some(claim_file),
            context_files: attachment::from_paths(&self.context_files),
            included_project_context: self.included_project_context,
            included_contractor_context: self.included_contractor_context,
        })
    }
}
