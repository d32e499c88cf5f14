//! Attachment - a file reference carried by any record

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file attached to a record
///
/// Attachments that have not been uploaded yet carry a local `path` and no
/// `id`. Attachments returned by the server carry the server id and the
/// storage path the server reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name for display
    pub name: String,

    /// Local path or server storage path
    pub path: String,

    /// Server-side identifier, once uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Attachment {
    /// Reference a local file that has not been uploaded
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: file_name(&path.to_string_lossy()),
            path: path.to_string_lossy().into_owned(),
            id: None,
        }
    }

    /// Reference a file stored on the server
    pub fn stored(id: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: file_name(&path),
            path,
            id: Some(id.into()),
        }
    }

    /// True when the file still needs to be sent to the server
    pub fn is_pending_upload(&self) -> bool {
        self.id.is_none()
    }

    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// Last path component, accepting both separators since server paths are
/// not necessarily native paths
fn file_name(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Build attachments for a list of local paths
pub fn from_paths(paths: &[PathBuf]) -> Vec<Attachment> {
    paths.iter().map(|p| Attachment::from_path(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_uses_file_name() {
        let att = Attachment::from_path(Path::new("docs/contracts/main.pdf"));
        assert_eq!(att.name, "main.pdf");
        assert!(att.is_pending_upload());
    }

    #[test]
    fn test_stored_parses_server_path() {
        let att = Attachment::stored("f-1", "uploads/claims/delay.docx");
        assert_eq!(att.name, "delay.docx");
        assert_eq!(att.id.as_deref(), Some("f-1"));
        assert!(!att.is_pending_upload());
    }

    #[test]
    fn test_windows_separator() {
        let att = Attachment::stored("f-2", "C:\\uploads\\scan.png");
        assert_eq!(att.name, "scan.png");
    }
}
