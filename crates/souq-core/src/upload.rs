//! # Upload Policy
//!
//! Limits applied to image uploads before anything leaves the process.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    UploadPolicy::validate(files)                        │
//! │                                                                         │
//! │  files.is_empty()?            → Required { field: "files" }            │
//! │       │                                                                 │
//! │  files.len() > max_files?     → TooManyFiles { max }                   │
//! │       │                                                                 │
//! │  for each file:                                                        │
//! │    content_type not allowed?  → NotAllowed { field: "content_type" }   │
//! │    size > max_file_bytes?     → FileTooLarge { file_name, max_bytes }  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │      OK → manager may start uploading                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A policy is an immutable value. Each entity manager owns its own copy, so
//! validating a category image can never change the limit used for products.

use crate::error::{ValidationError, ValidationResult};
use crate::types::UploadFile;
use crate::{ALLOWED_IMAGE_TYPES, DEFAULT_MAX_FILE_BYTES, MAX_PRODUCT_IMAGES};

/// Upload limits for one kind of entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_types: &'static [&'static str],
    max_file_bytes: usize,
    max_files: usize,
}

impl UploadPolicy {
    /// Creates an image policy with the given file count limit.
    pub const fn images(max_files: usize) -> Self {
        UploadPolicy {
            allowed_types: ALLOWED_IMAGE_TYPES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files,
        }
    }

    /// Policy for entities with exactly one image (categories).
    pub const fn single_image() -> Self {
        UploadPolicy::images(1)
    }

    /// Policy for product galleries.
    pub const fn product_images() -> Self {
        UploadPolicy::images(MAX_PRODUCT_IMAGES)
    }

    /// Overrides the per-file size cap.
    pub const fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// Checks a batch of files against the policy.
    pub fn validate(&self, files: &[UploadFile]) -> ValidationResult<()> {
        if files.is_empty() {
            return Err(ValidationError::required("files"));
        }

        if files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                max: self.max_files,
            });
        }

        files.iter().try_for_each(|file| self.validate_file(file))
    }

    /// Checks a single file's type and size.
    pub fn validate_file(&self, file: &UploadFile) -> ValidationResult<()> {
        let content_type = file.content_type.trim().to_ascii_lowercase();
        if !self.allowed_types.contains(&content_type.as_str()) {
            return Err(ValidationError::NotAllowed {
                field: "content_type".to_string(),
                allowed: self.allowed_types.iter().map(|t| t.to_string()).collect(),
            });
        }

        if file.size() > self.max_file_bytes {
            return Err(ValidationError::FileTooLarge {
                file_name: file.file_name.clone(),
                max_bytes: self.max_file_bytes,
            });
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        UploadPolicy::product_images()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> UploadFile {
        UploadFile::new("photo.png", "image/png", vec![0u8; size])
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = UploadPolicy::product_images().validate(&[]).unwrap_err();
        assert_eq!(err, ValidationError::required("files"));
    }

    #[test]
    fn test_file_count_limit() {
        let policy = UploadPolicy::product_images();
        let five: Vec<_> = (0..5).map(|_| png(10)).collect();
        let six: Vec<_> = (0..6).map(|_| png(10)).collect();

        assert!(policy.validate(&five).is_ok());
        assert_eq!(
            policy.validate(&six).unwrap_err(),
            ValidationError::TooManyFiles { max: 5 }
        );
    }

    #[test]
    fn test_single_image_policy_is_independent() {
        let single = UploadPolicy::single_image();
        let gallery = UploadPolicy::product_images();

        assert!(single.validate(&[png(1), png(1)]).is_err());
        // Using the single-image policy must not shrink the gallery limit.
        assert!(gallery.validate(&[png(1), png(1)]).is_ok());
        assert_eq!(gallery.max_files(), 5);
    }

    #[test]
    fn test_content_type_allow_list() {
        let policy = UploadPolicy::single_image();
        assert!(policy
            .validate(&[UploadFile::new("a.jpg", "image/jpeg", vec![1])])
            .is_ok());
        assert!(policy
            .validate(&[UploadFile::new("a.gif", "IMAGE/GIF", vec![1])])
            .is_ok());

        let err = policy
            .validate(&[UploadFile::new("a.svg", "image/svg+xml", vec![1])])
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_size_cap() {
        let policy = UploadPolicy::single_image();
        assert!(policy.validate(&[png(DEFAULT_MAX_FILE_BYTES)]).is_ok());

        let err = policy
            .validate(&[png(DEFAULT_MAX_FILE_BYTES + 1)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));

        let tight = UploadPolicy::single_image().with_max_file_bytes(10);
        assert!(tight.validate(&[png(11)]).is_err());
    }
}
