//! Country entity type - countries that projects are located in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::ValidationErrors;
use crate::entities::attachment::{self, Attachment};

/// A Country record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Unique identifier
    pub id: EntityId,

    /// Country name
    pub name: String,

    /// Flag image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Context files
    #[serde(default)]
    pub context_files: Vec<Attachment>,
}

impl Entity for Country {
    const PREFIX: EntityPrefix = EntityPrefix::Ctry;
    const KIND: &'static str = "country";
    const KIND_PLURAL: &'static str = "countries";

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

/// User-supplied fields for a new country
#[derive(Debug, Clone, Default)]
pub struct CountryDraft {
    pub name: String,
    pub flag_url: Option<String>,
    pub context_files: Vec<PathBuf>,
}

impl CountryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_flag_url(mut self, url: impl Into<String>) -> Self {
        self.flag_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Country name is required");
        errors.into_result()
    }

    /// Materialize the draft as a record with locally assigned identity
    pub fn into_record(self, id: EntityId, created_at: DateTime<Utc>) -> Country {
        Country {
            id,
            name: self.name.trim().to_string(),
            flag_url: self.flag_url,
            created_at,
            context_files: attachment::from_paths(&self.context_files),
        }
    }
}

impl Country {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        CountryDraft::new(self.name.clone()).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let errors = CountryDraft::new("  ").validate().unwrap_err();
        assert_eq!(errors.message_for("name"), Some("Country name is required"));
    }

    #[test]
    fn test_into_record_trims_name() {
        let id = EntityId::new(EntityPrefix::Ctry);
        let country = CountryDraft::new(" Germany ")
            .with_flag_url("https://flagcdn.com/w40/de.png")
            .into_record(id.clone(), Utc::now());

        assert_eq!(country.id, id);
        assert_eq!(country.name, "Germany");
        assert_eq!(country.title(), "Germany");
        assert!(country.context_files.is_empty());
    }

    #[test]
    fn test_entity_trait_implementation() {
        assert_eq!(Country::PREFIX, EntityPrefix::Ctry);
        assert_eq!(Country::KIND_PLURAL, "countries");
    }
}
