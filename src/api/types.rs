//! Wire types for the REST API
//!
//! Read shapes mirror the server schema (camelCase, `name` for every title).
//! Request shapes are plain structs; the resource layer turns them into a
//! query string plus a multipart body.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Server timestamps may or may not carry an offset; naive values are UTC.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

// =========================================================================
// Read shapes
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ContextFileRead {
    pub id: String,
    pub path: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub flag_url: Option<String>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDetail {
    #[serde(flatten)]
    pub country: CountryRead,
    #[serde(default)]
    pub projects: Vec<ProjectRead>,
    #[serde(default)]
    pub context_files: Vec<ContextFileRead>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRead,
    #[serde(default)]
    pub country: Option<CountryRead>,
    #[serde(default)]
    pub contractors: Vec<ContractorRead>,
    #[serde(default)]
    pub claims: Vec<ClaimRead>,
    #[serde(default)]
    pub context_files: Vec<ContextFileRead>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorRead {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorDetail {
    #[serde(flatten)]
    pub contractor: ContractorRead,
    #[serde(default)]
    pub projects: Vec<ProjectRead>,
    #[serde(default)]
    pub claims: Vec<ClaimRead>,
    #[serde(default)]
    pub context_files: Vec<ContextFileRead>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRead {
    pub id: String,
    pub name: String,
    pub contractor_id: String,
    pub project_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetail {
    #[serde(flatten)]
    pub claim: ClaimRead,
    #[serde(default)]
    pub project: Option<ProjectRead>,
    #[serde(default)]
    pub contractor: Option<ContractorRead>,
    #[serde(default)]
    pub context_files: Vec<ContextFileRead>,
}

// =========================================================================
// Request shapes
// =========================================================================

#[derive(Debug, Clone, Default)]
pub struct CreateCountry {
    pub name: String,
    pub flag_url: Option<String>,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCountry {
    pub name: Option<String>,
    pub flag_url: Option<String>,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    pub name: String,
    pub country_id: String,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub country_id: Option<String>,
    /// Replaces the contractor set when present
    pub contractors_ids: Option<Vec<String>>,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateContractor {
    pub name: String,
    pub projects_ids: Vec<String>,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContractor {
    pub name: Option<String>,
    /// Replaces the project set when present
    pub projects_ids: Option<Vec<String>>,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateClaim {
    pub name: String,
    pub contractor_id: String,
    pub project_id: String,
    pub claim_file: PathBuf,
    pub context_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClaim {
    pub name: Option<String>,
    pub contractor_id: Option<String>,
    pub project_id: Option<String>,
    pub claim_file: Option<PathBuf>,
    pub context_files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_timestamps_are_utc() {
        let ts = parse_timestamp("2025-03-01T09:30:00.123456").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T09:30:00.123456+00:00");

        let ts = parse_timestamp("2025-03-01T09:30:00Z").unwrap();
        assert_eq!(ts.timestamp(), 1740821400);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_project_detail_flattens_base() {
        let detail: ProjectDetail = serde_json::from_str(
            r#"{
                "id": "p-1",
                "name": "Highway A",
                "countryId": "c-1",
                "createdAt": "2025-01-01T00:00:00",
                "updatedAt": "2025-01-02T00:00:00",
                "country": {"id": "c-1", "name": "Germany", "flagUrl": null,
                            "createdAt": "2025-01-01T00:00:00", "updatedAt": "2025-01-01T00:00:00"},
                "contractors": [],
                "claims": [],
                "contextFiles": [{"id": "f-1", "path": "uploads/scope.pdf", "created_at": "2025-01-01T00:00:00"}]
            }"#,
        )
        .unwrap();

        assert_eq!(detail.project.name, "Highway A");
        assert_eq!(detail.project.country_id.as_deref(), Some("c-1"));
        assert_eq!(detail.country.unwrap().name, "Germany");
        assert_eq!(detail.context_files[0].path, "uploads/scope.pdf");
    }
}
