//! Entity trait - common interface for all record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all claimdesk records
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// The entity type prefix (e.g., PROJ, CLM)
    const PREFIX: EntityPrefix;

    /// Singular name used in messages (e.g., "project")
    const KIND: &'static str;

    /// Plural name used in messages (e.g., "projects")
    const KIND_PLURAL: &'static str;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Get the record's display title (name for countries and contractors)
    fn title(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;
}

/// Find a record by id with a linear scan
pub fn find_by_id<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id().as_str() == id)
}

/// Capitalize a kind name for notification titles ("project" -> "Project")
pub fn title_case(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
