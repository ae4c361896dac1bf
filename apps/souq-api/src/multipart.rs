//! Multipart form parsing.
//!
//! Parts carrying a file name become [`UploadFile`]s; every other part is
//! read as a UTF-8 text field. The part name of a file does not matter.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;

use souq_core::{UploadFile, ValidationError};

use crate::error::{ApiError, ApiResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A parsed multipart body.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub files: Vec<UploadFile>,
}

impl FormData {
    /// Drains every part of the request.
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_CONTENT_TYPE)
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        ApiError::validation(format!("failed to read file '{file_name}': {e}"))
                    })?;
                    form.files
                        .push(UploadFile::new(file_name, content_type, bytes.to_vec()));
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        ApiError::validation(format!("failed to read field '{name}': {e}"))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Optional text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Text field that must be present. Missing fields are left to domain
    /// validation as empty strings.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }

    /// Optional field parsed into `T`.
    pub fn parsed<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>> {
        match self.fields.get(name).map(|raw| raw.trim()) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                ApiError::validation(
                    ValidationError::invalid(name, "must be a whole number").to_string(),
                )
            }),
        }
    }

    /// Uploaded files, or `None` when the request carried none.
    pub fn files_if_any(&self) -> Option<&[UploadFile]> {
        (!self.files.is_empty()).then_some(self.files.as_slice())
    }
}
