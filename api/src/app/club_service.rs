//! Club service
//!
//! Club lifecycle, admins, membership and invite codes. Joining and deletion
//! run through callable server functions. Join failures are reported with the
//! invite-code errors of `ClubError`; the other callables map to plain HTTP
//! errors.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::app::group_service::replace_group_members;
use crate::domain::entities::{Club, ClubId, NewClub, PersonId};
use crate::domain::ports::{
    CallableFunctions, ClubRepository, GroupRepository, InviteCode, ObjectStorage,
    PersonRepository, ProfileImage,
};
use crate::error::{AppError, ClubError, ValidationError};

const INVITE_CODE_PATTERN: &str = r"^[A-Z0-9]{4,16}$";

/// Service for managing clubs
pub struct ClubService<CR, GR, PR, F, S>
where
    CR: ClubRepository,
    GR: GroupRepository,
    PR: PersonRepository,
    F: CallableFunctions,
    S: ObjectStorage,
{
    clubs: Arc<CR>,
    groups: Arc<GR>,
    persons: Arc<PR>,
    functions: Arc<F>,
    storage: Arc<S>,
}

impl<CR, GR, PR, F, S> ClubService<CR, GR, PR, F, S>
where
    CR: ClubRepository,
    GR: GroupRepository,
    PR: PersonRepository,
    F: CallableFunctions,
    S: ObjectStorage,
{
    pub fn new(
        clubs: Arc<CR>,
        groups: Arc<GR>,
        persons: Arc<PR>,
        functions: Arc<F>,
        storage: Arc<S>,
    ) -> Self {
        Self {
            clubs,
            groups,
            persons,
            functions,
            storage,
        }
    }

    /// Create a club owned by `actor`, who becomes its first admin and member
    pub async fn create_club(&self, actor: &PersonId, name: &str) -> Result<Club, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.persons
            .find_by_id(actor)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Person {}", actor)))?;

        let club = self
            .clubs
            .create(&NewClub {
                name: name.to_string(),
                owner_id: actor.clone(),
            })
            .await?;

        self.persons.add_club(actor, &club.id).await?;

        tracing::info!(club_id = %club.id, owner_id = %actor, "Club created");
        Ok(club)
    }

    /// A club the actor is a member of
    pub async fn get_club(&self, actor: &PersonId, club_id: &ClubId) -> Result<Club, AppError> {
        let club = self.load(club_id).await?;
        if !club.is_member(actor) {
            return Err(AppError::forbidden("Not a member of this club"));
        }
        Ok(club)
    }

    pub async fn list_my_clubs(&self, actor: &PersonId) -> Result<Vec<Club>, AppError> {
        Ok(self.clubs.find_by_member(actor).await?)
    }

    pub async fn is_admin(&self, actor: &PersonId, club_id: &ClubId) -> Result<bool, AppError> {
        Ok(self.load(club_id).await?.is_admin(actor))
    }

    pub async fn rename_club(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        name: &str,
    ) -> Result<Club, AppError> {
        let mut club = self.load_administered(actor, club_id).await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.clubs.update_name(club_id, name).await?;
        club.name = name.to_string();
        Ok(club)
    }

    /// Grant admin rights to a club member
    pub async fn promote_admin(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        target: &PersonId,
    ) -> Result<Club, AppError> {
        let club = self.load_administered(actor, club_id).await?;
        if !club.is_member(target) {
            return Err(ValidationError::NotClubMember.into());
        }
        if club.is_admin(target) {
            return Ok(club);
        }

        self.clubs.add_admin(club_id, target).await?;
        tracing::info!(club_id = %club_id, person_id = %target, "Admin promoted");
        self.load(club_id).await
    }

    /// Revoke admin rights; the owner keeps them
    pub async fn demote_admin(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        target: &PersonId,
    ) -> Result<Club, AppError> {
        let club = self.load_administered(actor, club_id).await?;
        if club.is_owner(target) {
            return Err(AppError::forbidden("The club owner cannot be demoted"));
        }
        if !club.is_admin(target) {
            return Ok(club);
        }

        self.clubs.remove_admin(club_id, target).await?;
        tracing::info!(club_id = %club_id, person_id = %target, "Admin demoted");
        self.load(club_id).await
    }

    /// Remove a member from the club and from every group of the club.
    ///
    /// Group rosters are updated first so a group never keeps a trainer
    /// or member that has left the club.
    pub async fn remove_member(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        target: &PersonId,
    ) -> Result<Club, AppError> {
        let club = self.load_administered(actor, club_id).await?;
        if club.is_owner(target) {
            return Err(AppError::forbidden("The club owner cannot be removed"));
        }
        if !club.is_member(target) {
            return Err(ValidationError::NotClubMember.into());
        }

        for group in self.groups.find_by_club(club_id).await? {
            if !group.is_member(target) {
                continue;
            }
            let remaining = group
                .member_ids
                .iter()
                .filter(|id| *id != target)
                .cloned()
                .collect();
            replace_group_members(self.groups.as_ref(), &group, remaining).await?;
        }

        self.clubs.remove_member(club_id, target).await?;
        if self.persons.find_by_id(target).await?.is_some() {
            self.persons.remove_club(target, club_id).await?;
        }

        tracing::info!(club_id = %club_id, person_id = %target, "Member removed");
        self.load(club_id).await
    }

    /// Redeem an invite code for `actor`
    pub async fn join_club(&self, actor: &PersonId, invite_code: &str) -> Result<Club, AppError> {
        let code = normalize_invite_code(invite_code)?;

        let club_id = self
            .functions
            .join_club_with_code(&code, actor)
            .await
            .map_err(|e| {
                tracing::debug!(person_id = %actor, code = %e.code, "Join rejected");
                ClubError::from_join_failure(e)
            })?;

        tracing::info!(club_id = %club_id, person_id = %actor, "Joined club");
        self.load(&club_id).await
    }

    pub async fn generate_invite_code(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<InviteCode, AppError> {
        self.load_administered(actor, club_id).await?;
        Ok(self.functions.generate_club_invite_code(club_id).await?)
    }

    pub async fn disable_invite_code(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
    ) -> Result<(), AppError> {
        self.load_administered(actor, club_id).await?;
        Ok(self.functions.disable_club_invite_code(club_id).await?)
    }

    /// Delete the club and everything it owns (owner only)
    pub async fn delete_club(&self, actor: &PersonId, club_id: &ClubId) -> Result<(), AppError> {
        let club = self.load(club_id).await?;
        if !club.is_owner(actor) {
            return Err(ClubError::NotOwner.into());
        }

        self.functions.delete_club(club_id).await?;

        tracing::info!(club_id = %club_id, "Club deleted");
        Ok(())
    }

    /// Store a new club profile image and return its URL
    pub async fn upload_club_image(
        &self,
        actor: &PersonId,
        club_id: &ClubId,
        image: ProfileImage,
    ) -> Result<String, AppError> {
        self.load_administered(actor, club_id).await?;

        let path = image.club_path(club_id);
        let content_type = image.content_type();
        let url = self.storage.put(&path, image.bytes, content_type).await?;
        self.clubs.update_image_url(club_id, &url).await?;
        Ok(url)
    }

    async fn load(&self, club_id: &ClubId) -> Result<Club, AppError> {
        self.clubs
            .find_by_id(club_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Club {}", club_id)))
    }

    async fn load_administered(&self, actor: &PersonId, club_id: &ClubId) -> Result<Club, AppError> {
        let club = self.load(club_id).await?;
        if !club.is_admin(actor) {
            return Err(AppError::forbidden("Only club admins can do this"));
        }
        Ok(club)
    }
}

fn invite_code_pattern() -> Result<&'static Regex, AppError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(INVITE_CODE_PATTERN))
        .as_ref()
        .map_err(|e| AppError::Internal(format!("invite code pattern: {}", e)))
}

/// Trim and uppercase a user-entered invite code, rejecting malformed ones locally
fn normalize_invite_code(raw: &str) -> Result<String, AppError> {
    let code = raw.trim().to_uppercase();
    if !invite_code_pattern()?.is_match(&code) {
        return Err(ClubError::InvalidInviteCode.into());
    }
    Ok(code)
}
