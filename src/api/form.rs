//! Multipart body builder
//!
//! File attachments and id lists travel in a multipart body; scalar fields
//! travel in the query string. Missing values are skipped, list values
//! become repeated parts under the same name.

use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

use crate::api::error::{ApiError, Result};

#[derive(Debug, Default)]
pub struct MultipartBody {
    texts: Vec<(&'static str, String)>,
    files: Vec<(&'static str, PathBuf)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one text part per item
    pub fn texts<I, S>(mut self, name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.texts
            .extend(values.into_iter().map(|v| (name, v.to_string())));
        self
    }

    /// Add one file part per path
    pub fn files<I, P>(mut self, name: &'static str, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.files
            .extend(paths.into_iter().map(|p| (name, p.as_ref().to_path_buf())));
        self
    }

    /// Add a single optional file part
    pub fn file(self, name: &'static str, path: Option<&Path>) -> Self {
        self.files(name, path)
    }

    pub fn part_count(&self) -> usize {
        self.texts.len() + self.files.len()
    }

    /// Names of all parts, in the order they will be sent
    pub fn part_names(&self) -> Vec<&'static str> {
        self.texts
            .iter()
            .map(|(n, _)| *n)
            .chain(self.files.iter().map(|(n, _)| *n))
            .collect()
    }

    /// Read the files and build the request form
    pub async fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.texts {
            form = form.text(name, value);
        }
        for (name, path) in self.files {
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| ApiError::Attachment {
                    path: path.clone(),
                    source,
                })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            form = form.part(name, Part::bytes(data).file_name(file_name));
        }
        Ok(form)
    }
}

/// Query parameters for scalar fields, skipping missing and blank values
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((name, value.into()));
        self
    }

    /// Add the parameter only when a non-blank value is present
    pub fn set_opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.set(name, v),
            _ => self,
        }
    }

    pub fn as_slice(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}
