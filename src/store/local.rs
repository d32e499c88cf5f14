//! Local backend - all four collections in a single JSON file
//!
//! The file holds one top-level key per collection. Each key is decoded on
//! its own, so a damaged collection reads as empty without taking the others
//! down with it. Writes refuse to touch a collection that does not decode.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::entities::{
    Claim, ClaimDraft, Contractor, ContractorDraft, Country, CountryDraft, Project, ProjectDraft,
};
use crate::store::backend::{Backend, CascadeAuthority, Result};

/// File name inside the data directory
pub const STORE_FILE: &str = "store.json";

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a JSON object; refusing to overwrite it")]
    Corrupt { path: PathBuf },

    #[error("Stored {kind} could not be decoded; refusing to overwrite them: {source}")]
    Damaged {
        kind: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        source: serde_json::Error,
    },

    #[error("No {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },
}

/// Backend persisting to `<data_dir>/store.json`
#[derive(Debug)]
pub struct LocalBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalBackend {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw top-level object, `None` when the file does not exist yet
    async fn read_object(
        &self,
    ) -> std::result::Result<Option<Map<String, Value>>, LocalStoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LocalStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            _ => Err(LocalStoreError::Corrupt {
                path: self.path.clone(),
            }),
        }
    }

    async fn read_collection<T: Entity>(&self) -> std::result::Result<Vec<T>, LocalStoreError> {
        match self.read_object().await {
            Ok(Some(map)) => Ok(decode_or_empty(&map)),
            Ok(None) => Ok(Vec::new()),
            Err(LocalStoreError::Corrupt { path }) => {
                warn!("{} is unreadable, treating all collections as empty", path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Read-modify-write one collection, leaving the other keys untouched
    ///
    /// Fails with `Damaged` rather than rewriting a collection that does not
    /// decode, so the records already stored in it are never dropped.
    async fn modify<T, R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> std::result::Result<R, LocalStoreError>,
    ) -> std::result::Result<R, LocalStoreError>
    where
        T: Entity,
    {
        let _guard = self.write_lock.lock().await;

        let mut map = self.read_object().await?.unwrap_or_default();
        let mut items = decode::<T>(&map)?;
        let result = f(&mut items)?;

        let value = serde_json::to_value(&items).map_err(|source| LocalStoreError::Encode {
            kind: T::KIND_PLURAL,
            source,
        })?;
        map.insert(T::KIND_PLURAL.to_string(), value);
        self.write_object(&map).await?;

        Ok(result)
    }

    async fn write_object(
        &self,
        map: &Map<String, Value>,
    ) -> std::result::Result<(), LocalStoreError> {
        let write_err = |source: std::io::Error| LocalStoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(map).map_err(|source| {
            LocalStoreError::Encode {
                kind: "store",
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }

    async fn insert<T: Entity>(&self, record: T) -> Result<T> {
        let stored = record.clone();
        self.modify::<T, _>(|items| {
            items.push(record);
            Ok(())
        })
        .await?;
        Ok(stored)
    }

    async fn replace<T: Entity>(&self, record: &T) -> Result<T> {
        self.modify::<T, _>(|items| {
            let slot = items
                .iter_mut()
                .find(|item| item.id() == record.id())
                .ok_or_else(|| LocalStoreError::NotFound {
                    kind: T::KIND,
                    id: record.id().to_string(),
                })?;
            *slot = record.clone();
            Ok(())
        })
        .await?;
        Ok(record.clone())
    }

    async fn remove<T: Entity>(&self, id: &EntityId) -> Result<()> {
        self.modify::<T, _>(|items| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            if items.len() == before {
                return Err(LocalStoreError::NotFound {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            Ok(())
        })
        .await?;
        Ok(())
    }
}

/// Decode one collection; an absent key is an empty collection
fn decode<T: Entity>(map: &Map<String, Value>) -> std::result::Result<Vec<T>, LocalStoreError> {
    let Some(value) = map.get(T::KIND_PLURAL) else {
        return Ok(Vec::new());
    };

    serde_json::from_value::<Vec<T>>(value.clone()).map_err(|source| LocalStoreError::Damaged {
        kind: T::KIND_PLURAL,
        source,
    })
}

/// Decode for reading; a damaged key reads as empty
fn decode_or_empty<T: Entity>(map: &Map<String, Value>) -> Vec<T> {
    decode(map).unwrap_or_else(|e| {
        warn!("{}, treating as empty", e);
        Vec::new()
    })
}

#[async_trait]
impl Backend for LocalBackend {
    fn cascade_authority(&self) -> CascadeAuthority {
        CascadeAuthority::Client
    }

    fn describe(&self) -> String {
        format!("local ({})", self.path.display())
    }

    async fn list_countries(&self) -> Result<Vec<Country>> {
        Ok(self.read_collection().await?)
    }

    async fn create_country(&self, draft: CountryDraft) -> Result<Country> {
        draft.validate()?;
        self.insert(draft.into_record(EntityId::new(Country::PREFIX), Utc::now())).await
    }

    async fn update_country(&self, country: &Country) -> Result<Country> {
        country.validate()?;
        self.replace(country).await
    }

    async fn delete_country(&self, id: &EntityId) -> Result<()> {
        self.remove::<Country>(id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.read_collection().await?)
    }

    async fn create_project(&self, draft: ProjectDraft) -> Result<Project> {
        draft.validate()?;
        self.insert(draft.into_record(EntityId::new(Project::PREFIX), Utc::now())).await
    }

    async fn update_project(&self, project: &Project) -> Result<Project> {
        project.validate()?;
        self.replace(project).await
    }

    async fn delete_project(&self, id: &EntityId) -> Result<()> {
        self.remove::<Project>(id).await
    }

    async fn list_contractors(&self) -> Result<Vec<Contractor>> {
        Ok(self.read_collection().await?)
    }

    async fn create_contractor(&self, draft: ContractorDraft) -> Result<Contractor> {
        draft.validate()?;
        self.insert(draft.into_record(EntityId::new(Contractor::PREFIX), Utc::now())).await
    }

    async fn update_contractor(&self, contractor: &Contractor) -> Result<Contractor> {
        contractor.validate()?;
        self.replace(contractor).await
    }

    async fn delete_contractor(&self, id: &EntityId) -> Result<()> {
        self.remove::<Contractor>(id).await
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        Ok(self.read_collection().await?)
    }

    async fn create_claim(&self, draft: ClaimDraft) -> Result<Claim> {
        let claim = draft.into_record(EntityId::new(Claim::PREFIX), Utc::now())?;
        self.insert(claim).await
    }

    async fn update_claim(&self, claim: &Claim) -> Result<Claim> {
        claim.validate()?;
        self.replace(claim).await
    }

    async fn delete_claim(&self, id: &EntityId) -> Result<()> {
        self.remove::<Claim>(id).await
    }
}
