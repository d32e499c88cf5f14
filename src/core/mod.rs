//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod shortid;
pub mod validation;

pub use config::{BackendKind, Config, ConfigError, ConfigFile};
pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use shortid::ShortIdIndex;
pub use validation::{FieldError, ValidationErrors};
