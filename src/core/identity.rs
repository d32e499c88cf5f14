//! Entity identity - prefixed identifiers for records
//!
//! Locally created records get `PREFIX-<ULID>` identifiers. Records that come
//! back from the REST backend keep whatever identifier the server assigned.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Country
    Ctry,
    /// Project
    Proj,
    /// Contractor
    Ctr,
    /// Claim
    Clm,
}

impl EntityPrefix {
    /// All prefixes, in dependency order
    pub const ALL: [EntityPrefix; 4] = [
        EntityPrefix::Ctry,
        EntityPrefix::Proj,
        EntityPrefix::Ctr,
        EntityPrefix::Clm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Ctry => "CTRY",
            EntityPrefix::Proj => "PROJ",
            EntityPrefix::Ctr => "CTR",
            EntityPrefix::Clm => "CLM",
        }
    }
}

impl std::fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CTRY" => Ok(EntityPrefix::Ctry),
            "PROJ" => Ok(EntityPrefix::Proj),
            "CTR" => Ok(EntityPrefix::Ctr),
            "CLM" => Ok(EntityPrefix::Clm),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Entity ID cannot be empty")]
    Empty,

    #[error("Entity ID contains whitespace: '{0}'")]
    Whitespace(String),

    #[error("Unknown entity prefix: {0}")]
    UnknownPrefix(String),
}

/// A record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh identifier for a locally created record
    pub fn new(prefix: EntityPrefix) -> Self {
        Self(format!("{}-{}", prefix, Ulid::new()))
    }

    /// Parse an identifier typed by a user or returned by the server
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdParseError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Prefix of a locally generated identifier, if it has one
    pub fn prefix(&self) -> Option<EntityPrefix> {
        self.0.split_once('-').and_then(|(p, _)| p.parse().ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_prefixed_and_unique() {
        let a = EntityId::new(EntityPrefix::Proj);
        let b = EntityId::new(EntityPrefix::Proj);

        assert!(a.as_str().starts_with("PROJ-"));
        assert_ne!(a, b);
        assert_eq!(a.prefix(), Some(EntityPrefix::Proj));
    }

    #[test]
    fn test_server_ids_pass_through() {
        let id = EntityId::parse("3f0e6f3c-1b9e-4a8d-9a43-3d1f0b0c5e7a").unwrap();
        assert_eq!(id.as_str(), "3f0e6f3c-1b9e-4a8d-9a43-3d1f0b0c5e7a");
        assert_eq!(id.prefix(), None);
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert_eq!(EntityId::parse("   "), Err(IdParseError::Empty));
        assert!(matches!(
            EntityId::parse("PROJ 1"),
            Err(IdParseError::Whitespace(_))
        ));
    }

    #[test]
    fn test_prefix_from_str_case_insensitive() {
        assert_eq!("clm".parse::<EntityPrefix>().unwrap(), EntityPrefix::Clm);
        assert!("REQ".parse::<EntityPrefix>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = EntityId::from("CTR-01ABC".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CTR-01ABC\"");
    }
}
