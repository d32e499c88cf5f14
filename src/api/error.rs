//! Error types for the REST client

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// REST client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure (connection refused, DNS, TLS...)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status {
        status: u16,
        reason: String,
        detail: Option<HttpValidationError>,
    },

    /// Response body did not match the declared shape
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A file to upload could not be read
    #[error("Failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field-level validation entries reported by the server
    pub fn validation_details(&self) -> &[ValidationDetail] {
        match self {
            ApiError::Status {
                detail: Some(HttpValidationError {
                    detail: Some(Detail::Fields(fields)),
                }),
                ..
            } => fields,
            _ => &[],
        }
    }

    /// Human-readable message for notifications
    ///
    /// Validation entries are concatenated as `loc: msg`; a plain server
    /// message is shown as-is; anything else falls back to the error text.
    pub fn user_message(&self) -> String {
        let fields = self.validation_details();
        if !fields.is_empty() {
            return fields
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ");
        }

        if let ApiError::Status {
            detail:
                Some(HttpValidationError {
                    detail: Some(Detail::Message(message)),
                }),
            ..
        } = self
        {
            return message.clone();
        }

        self.to_string()
    }
}

/// Error body returned by the server on 4xx responses
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpValidationError {
    #[serde(default)]
    pub detail: Option<Detail>,
}

/// Either a list of field errors or a plain message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Fields(Vec<ValidationDetail>),
    Message(String),
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationDetail {
    /// Path to the field (e.g., ["query", "name"])
    #[serde(default)]
    pub loc: Vec<LocSegment>,

    pub msg: String,

    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Path segment inside a validation location
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Field(String),
    Index(i64),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Field(s) => f.write_str(s),
            LocSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_empty() {
            return f.write_str(&self.msg);
        }
        let loc: Vec<String> = self.loc.iter().map(|s| s.to_string()).collect();
        write!(f, "{}: {}", loc.join("."), self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(body: &str) -> ApiError {
        ApiError::Status {
            status: 422,
            reason: "Unprocessable Entity".to_string(),
            detail: serde_json::from_str(body).ok(),
        }
    }

    #[test]
    fn test_user_message_concatenates_fields() {
        let err = status_error(
            r#"{"detail":[
                {"loc":["query","name"],"msg":"Field required","type":"missing"},
                {"loc":["body","contextFiles",0],"msg":"Expected UploadFile","type":"value_error"}
            ]}"#,
        );

        assert_eq!(err.status(), Some(422));
        assert_eq!(err.validation_details().len(), 2);
        insta::assert_snapshot!(
            err.user_message(),
            @"query.name: Field required; body.contextFiles.0: Expected UploadFile"
        );
    }

    #[test]
    fn test_user_message_plain_detail() {
        let err = status_error(r#"{"detail":"Project not found"}"#);
        assert_eq!(err.user_message(), "Project not found");
        assert!(err.validation_details().is_empty());
    }

    #[test]
    fn test_user_message_without_body() {
        let err = ApiError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
            detail: None,
        };
        assert_eq!(err.user_message(), "HTTP 500: Internal Server Error");
    }
}
