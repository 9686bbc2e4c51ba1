//! Multipart form parsing helpers
//!
//! Collects file and text fields from a multipart/form-data request and
//! enforces the one-file-per-field rule.

use std::collections::HashMap;

use axum::extract::Multipart;
use bakery_core::{single_upload, Upload};

use crate::error::ApiError;
use crate::validation::{validate_content_type, validate_file_size};

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

/// Parsed multipart form fields
#[derive(Debug, Default)]
pub struct MultipartFields {
    /// Every file part, grouped by field name
    files: HashMap<String, Vec<FileField>>,
    /// Text fields indexed by name
    text_fields: HashMap<String, String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// Fields named in `file_fields` are read as raw bytes and size-checked;
    /// everything else is read as text. Repeated file fields are kept so
    /// [`take_single`](Self::take_single) can reject them.
    pub async fn parse(
        multipart: &mut Multipart,
        file_fields: &[&str],
        max_file_size: usize,
    ) -> Result<Self, ApiError> {
        let mut fields = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if file_fields.contains(&name.as_str()) {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();
                validate_file_size(data.len(), max_file_size)?;

                fields.files.entry(name).or_default().push(FileField {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                fields.text_fields.insert(name, value);
            }
        }

        Ok(fields)
    }

    /// Take the single file sent under `name`, checking its Content-Type.
    ///
    /// Zero or several parts under the same name are rejected.
    pub fn take_single(&mut self, name: &str, allowed_types: &[&str]) -> Result<Upload, ApiError> {
        let parts = self.files.remove(name).unwrap_or_default();
        for part in &parts {
            validate_content_type(part.content_type.as_deref(), allowed_types)?;
        }
        let uploads = parts
            .into_iter()
            .map(|part| Upload::new(part.file_name.unwrap_or_else(|| name.to_string()), part.data))
            .collect();
        Ok(single_upload(uploads)?)
    }

    /// Number of file parts received under `name`
    pub fn file_count(&self, name: &str) -> usize {
        self.files.get(name).map_or(0, Vec::len)
    }

    /// Get a text field value
    ///
    /// Returns `None` if the field is not present.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(|s| s.as_str())
    }

    /// Get a text field parsed as a boolean
    ///
    /// Returns `true` if the field value is "true" (case-insensitive), `false` otherwise.
    pub fn get_bool(&self, name: &str) -> bool {
        self.text_fields
            .get(name)
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
