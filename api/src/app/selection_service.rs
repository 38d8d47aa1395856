//! Selected club/person and shared club observation
//!
//! Each user has one selected club and person, kept in their preferences.
//! Observers of a club share one listener per club through the
//! subscription registry.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;

use crate::app::subscriptions::{Subscription, SubscriptionRegistry};
use crate::domain::entities::{
    Club, ClubId, DateFormat, PersonId, Preferences, ThemeMode, TimeFormat, UserId,
};
use crate::domain::ports::{ClubRepository, PreferencesStore};
use crate::error::{AppError, DomainError, ValidationError};

/// A club as seen by one person
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubSnapshot {
    /// `None` once the club has been deleted
    pub club: Option<Club>,
    pub is_admin: bool,
    pub is_owner: bool,
}

impl ClubSnapshot {
    fn for_person(club: Option<Club>, person_id: &PersonId) -> Self {
        let is_admin = club.as_ref().is_some_and(|c| c.is_admin(person_id));
        let is_owner = club.as_ref().is_some_and(|c| c.is_owner(person_id));
        Self {
            club,
            is_admin,
            is_owner,
        }
    }
}

/// Display settings to change; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct DisplaySettings {
    pub theme_mode: Option<ThemeMode>,
    pub date_format: Option<DateFormat>,
    pub time_format: Option<TimeFormat>,
}

pub struct SelectionService<P, CR>
where
    P: PreferencesStore,
    CR: ClubRepository,
{
    preferences: Arc<P>,
    clubs: Arc<CR>,
    registry: SubscriptionRegistry<Club>,
    wait_timeout: Duration,
}

impl<P, CR> SelectionService<P, CR>
where
    P: PreferencesStore,
    CR: ClubRepository,
{
    pub fn new(preferences: Arc<P>, clubs: Arc<CR>, wait_timeout: Duration) -> Self {
        Self {
            preferences,
            clubs,
            registry: SubscriptionRegistry::new(),
            wait_timeout,
        }
    }

    pub async fn preferences(&self, user_id: &UserId) -> Result<Preferences, AppError> {
        Ok(self.preferences.load(user_id).await?)
    }

    pub async fn update_display(
        &self,
        user_id: &UserId,
        settings: DisplaySettings,
    ) -> Result<Preferences, AppError> {
        let mut preferences = self.preferences.load(user_id).await?;
        if let Some(theme_mode) = settings.theme_mode {
            preferences.theme_mode = theme_mode;
        }
        if let Some(date_format) = settings.date_format {
            preferences.date_format = date_format;
        }
        if let Some(time_format) = settings.time_format {
            preferences.time_format = time_format;
        }
        self.preferences.save(user_id, &preferences).await?;
        Ok(preferences)
    }

    /// Remember the person the user last acted as; ownership is checked by the caller
    pub async fn select_person(
        &self,
        user_id: &UserId,
        person_id: &PersonId,
    ) -> Result<Preferences, AppError> {
        let mut preferences = self.preferences.load(user_id).await?;
        preferences.selected_person_id = Some(person_id.clone());
        self.preferences.save(user_id, &preferences).await?;
        Ok(preferences)
    }

    /// Select a club the acting person belongs to
    pub async fn select_club(
        &self,
        user_id: &UserId,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<Preferences, AppError> {
        let club = self
            .clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))?;
        if !club.is_member(actor) {
            return Err(ValidationError::NotClubMember.into());
        }

        let mut preferences = self.preferences.load(user_id).await?;
        preferences.selected_club_id = Some(club_id.clone());
        preferences.selected_person_id = Some(actor.clone());
        self.preferences.save(user_id, &preferences).await?;
        tracing::debug!(user_id = %user_id, club_id = %club_id, "Club selected");
        Ok(preferences)
    }

    /// Attach to the shared listener of a club
    pub fn subscribe_club(&self, club_id: &ClubId) -> Subscription<Club> {
        self.registry
            .subscribe(club_id.as_str(), || self.clubs.watch(club_id))
    }

    /// Live snapshots of a club with the person's roles in it
    pub fn watch_club_for(
        &self,
        person_id: &PersonId,
        club_id: &ClubId,
    ) -> BoxStream<'static, Result<ClubSnapshot, DomainError>> {
        let person_id = person_id.clone();
        subscription_stream(self.subscribe_club(club_id))
            .map(move |update| update.map(|club| ClubSnapshot::for_person(club, &person_id)))
            .boxed()
    }

    /// Whether the person is an admin of the club, emitted on every change of that fact
    pub fn observe_is_admin(
        &self,
        person_id: &PersonId,
        club_id: &ClubId,
    ) -> BoxStream<'static, bool> {
        let person_id = person_id.clone();
        subscription_stream(self.subscribe_club(club_id))
            .filter_map(move |update| {
                let is_admin = update
                    .ok()
                    .map(|club| club.is_some_and(|c| c.is_admin(&person_id)));
                async move { is_admin }
            })
            .scan(None, |last: &mut Option<bool>, is_admin| {
                let changed = *last != Some(is_admin);
                *last = Some(is_admin);
                async move { Some(changed.then_some(is_admin)) }
            })
            .filter_map(|changed| async move { changed })
            .boxed()
    }

    /// The user's selected club, waiting for the shared listener to deliver it.
    ///
    /// If the wait fails or times out, the listener's last cached club is
    /// returned instead of the error.
    pub async fn await_selected_club(&self, user_id: &UserId) -> Result<Option<Club>, AppError> {
        let preferences = self.preferences.load(user_id).await?;
        let Some(club_id) = preferences.selected_club_id else {
            return Ok(None);
        };

        let mut subscription = self.subscribe_club(&club_id);
        let waited = tokio::time::timeout(self.wait_timeout, async {
            loop {
                match subscription.recv().await {
                    Some(Ok(Some(club))) => return Ok(club),
                    Some(Ok(None)) => continue,
                    Some(Err(e)) => return Err(e),
                    None => {
                        return Err(DomainError::Internal("club listener closed".to_string()))
                    }
                }
            }
        })
        .await;

        match waited {
            Ok(Ok(club)) => Ok(Some(club)),
            Ok(Err(e)) => {
                tracing::warn!(club_id = %club_id, error = %e, "Falling back to cached club");
                Ok(subscription.current())
            }
            Err(_) => {
                tracing::warn!(club_id = %club_id, "Timed out waiting for club, using cache");
                Ok(subscription.current())
            }
        }
    }

    pub fn active_listeners(&self) -> usize {
        self.registry.active_listeners()
    }
}

fn subscription_stream<V>(
    subscription: Subscription<V>,
) -> BoxStream<'static, Result<Option<V>, DomainError>>
where
    V: Clone + Send + Sync + 'static,
{
    stream::unfold(subscription, |mut subscription| async move {
        let update = subscription.recv().await?;
        Some((update, subscription))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryClubRepository;
    use crate::test_utils::{pid, test_club, InMemoryPreferencesStore};

    type TestService = SelectionService<InMemoryPreferencesStore, InMemoryClubRepository>;

    fn setup() -> (TestService, Arc<InMemoryClubRepository>) {
        let clubs = Arc::new(
            InMemoryClubRepository::new().with_club(test_club("club", "O", &["A"], &["O", "A", "B"])),
        );
        let service = SelectionService::new(
            Arc::new(InMemoryPreferencesStore::new()),
            clubs.clone(),
            Duration::from_millis(200),
        );
        (service, clubs)
    }

    fn user() -> UserId {
        UserId::from("u1")
    }

    #[tokio::test]
    async fn select_club_requires_membership() {
        let (service, _) = setup();

        let prefs = service
            .select_club(&user(), &pid("B"), &ClubId::from("club"))
            .await
            .unwrap();
        assert_eq!(prefs.selected_club_id, Some(ClubId::from("club")));
        assert_eq!(prefs.selected_person_id, Some(pid("B")));

        let err = service
            .select_club(&user(), &pid("X"), &ClubId::from("club"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::NotClubMember)
        ));
    }

    #[tokio::test]
    async fn display_settings_are_merged() {
        let (service, _) = setup();

        let prefs = service
            .update_display(
                &user(),
                DisplaySettings {
                    theme_mode: Some(ThemeMode::Dark),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(prefs.theme_mode, ThemeMode::Dark);
        assert_eq!(prefs.time_format, TimeFormat::default());

        let reloaded = service.preferences(&user()).await.unwrap();
        assert_eq!(reloaded, prefs);
    }

    #[tokio::test]
    async fn await_selected_club_returns_current_club() {
        let (service, _) = setup();
        assert!(service.await_selected_club(&user()).await.unwrap().is_none());

        service
            .select_club(&user(), &pid("A"), &ClubId::from("club"))
            .await
            .unwrap();
        let club = service.await_selected_club(&user()).await.unwrap();
        assert_eq!(club.map(|c| c.id), Some(ClubId::from("club")));
        assert_eq!(service.active_listeners(), 0);
    }

    #[tokio::test]
    async fn await_selected_club_falls_back_when_club_is_gone() {
        let (service, clubs) = setup();
        service
            .select_club(&user(), &pid("A"), &ClubId::from("club"))
            .await
            .unwrap();
        clubs.delete(&ClubId::from("club")).await.unwrap();

        let club = service.await_selected_club(&user()).await.unwrap();
        assert!(club.is_none());
    }

    #[tokio::test]
    async fn watchers_share_one_listener() {
        let (service, clubs) = setup();
        let club_id = ClubId::from("club");

        let mut admin = service.watch_club_for(&pid("A"), &club_id);
        let mut member = service.watch_club_for(&pid("B"), &club_id);
        assert_eq!(service.active_listeners(), 1);

        let first = admin.next().await.unwrap().unwrap();
        assert!(first.is_admin);
        assert!(!first.is_owner);
        let first = member.next().await.unwrap().unwrap();
        assert!(!first.is_admin);

        clubs.update_name(&club_id, "Renamed").await.unwrap();
        let next = member.next().await.unwrap().unwrap();
        assert_eq!(next.club.map(|c| c.name), Some("Renamed".to_string()));

        drop(admin);
        drop(member);
        assert_eq!(service.active_listeners(), 0);
    }

    #[tokio::test]
    async fn admin_flag_emits_on_change_only() {
        let (service, clubs) = setup();
        let club_id = ClubId::from("club");
        let mut is_admin = service.observe_is_admin(&pid("B"), &club_id);

        assert!(!is_admin.next().await.unwrap());

        clubs.update_name(&club_id, "Same roles").await.unwrap();
        clubs.add_admin(&club_id, &pid("B")).await.unwrap();
        assert!(is_admin.next().await.unwrap());
    }
}
