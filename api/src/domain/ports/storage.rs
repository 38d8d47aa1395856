//! Object storage port
//!
//! Profile images live at `clubs/{clubId}/profile.{ext}` and
//! `persons/{personId}/profile.{ext}`.

use async_trait::async_trait;

use crate::domain::entities::{ClubId, PersonId};
use crate::error::{DomainError, ValidationError};

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// A validated profile image ready for upload
#[derive(Debug, Clone)]
pub struct ProfileImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ProfileImage {
    pub fn new(extension: &str, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let extension = extension.trim().trim_start_matches('.').to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ValidationError::InvalidImageExtension(extension));
        }
        Ok(Self { extension, bytes })
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            _ => "image/jpeg",
        }
    }

    pub fn club_path(&self, club_id: &ClubId) -> String {
        format!("clubs/{}/profile.{}", club_id, self.extension)
    }

    pub fn person_path(&self, person_id: &PersonId) -> String {
        format!("persons/{}/profile.{}", person_id, self.extension)
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path`, replacing any previous object, and return its public URL
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_normalized() {
        let image = ProfileImage::new(".PNG", vec![1, 2, 3]).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(
            image.club_path(&ClubId::from("c1")),
            "clubs/c1/profile.png"
        );
        assert_eq!(
            image.person_path(&PersonId::from("p1")),
            "persons/p1/profile.png"
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        assert_eq!(
            ProfileImage::new("gif", vec![]).unwrap_err(),
            ValidationError::InvalidImageExtension("gif".to_string())
        );
    }
}
