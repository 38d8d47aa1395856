//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod accounts;
pub mod clubs;
pub mod events;
pub mod groups;
pub mod persons;
pub mod preferences;
pub mod trainings;
pub mod watch;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::domain::ports::ProfileImage;
use crate::error::AppError;

pub use accounts::{mark_email_verified, me, register};
pub use clubs::{
    club_statistics, create_club, delete_club, demote_admin, disable_invite_code,
    generate_invite_code, get_club, is_admin, join_club, list_my_clubs, promote_admin,
    remove_member, rename_club, upload_club_image,
};
pub use events::{create_event, delete_event, list_events, respond, update_event};
pub use groups::{
    create_group, delete_group, get_group, group_access, group_statistics, list_groups,
    rename_group, update_members, update_trainers,
};
pub use persons::{
    create_person, list_club_persons, list_my_persons, update_person, upload_person_image,
};
pub use preferences::{get_preferences, selected_club, select_club, update_preferences};
pub use trainings::{
    create_training, delete_training, get_training, list_trainings, set_attendance, update_notes,
};
pub use watch::{watch_club, watch_is_admin};

/// Profile image upload body: a file extension and base64-encoded bytes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub extension: String,
    pub data: String,
}

impl ImageUpload {
    pub fn decode(self) -> Result<ProfileImage, AppError> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|e| AppError::BadRequest(format!("Invalid image data: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Image data is empty".to_string()));
        }
        Ok(ProfileImage::new(&self.extension, bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn decodes_base64_image() {
        let upload = ImageUpload {
            extension: "PNG".to_string(),
            data: STANDARD.encode([137u8, 80, 78, 71]),
        };
        let image = upload.decode().unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, vec![137u8, 80, 78, 71]);
    }

    #[test]
    fn rejects_garbage_and_bad_extensions() {
        let garbage = ImageUpload {
            extension: "png".to_string(),
            data: "not base64!".to_string(),
        };
        assert!(matches!(garbage.decode(), Err(AppError::BadRequest(_))));

        let gif = ImageUpload {
            extension: "gif".to_string(),
            data: STANDARD.encode([1u8]),
        };
        assert!(matches!(
            gif.decode(),
            Err(AppError::Validation(ValidationError::InvalidImageExtension(_)))
        ));
    }
}
