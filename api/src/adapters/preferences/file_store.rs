//! JSON-file preference store: one `{user_id}.json` file per account

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::{Preferences, UserId};
use crate::domain::ports::PreferencesStore;
use crate::error::DomainError;

pub struct JsonFilePreferencesStore {
    dir: PathBuf,
}

impl JsonFilePreferencesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, user_id: &UserId) -> PathBuf {
        // User ids are generated hex strings; anything else is reduced to a safe name
        let name: String = user_id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl PreferencesStore for JsonFilePreferencesStore {
    async fn load(&self, user_id: &UserId) -> Result<Preferences, DomainError> {
        let path = self.file_for(user_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Preferences>(&bytes) {
                Ok(preferences) => Ok(preferences),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable preferences");
                    Ok(Preferences::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(DomainError::Internal(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn save(&self, user_id: &UserId, preferences: &Preferences) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Internal(format!("create {}: {}", self.dir.display(), e)))?;

        let path = self.file_for(user_id);
        let json = serde_json::to_vec_pretty(preferences)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| DomainError::Internal(format!("write {}: {}", path.display(), e)))
    }
}
