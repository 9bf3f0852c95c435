//! Coordinator driving verification-gated identity mutations.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use sd_shared::utils::phone::{is_valid_phone, mask_phone};
use sd_shared::utils::validation::{
    is_valid_email, is_valid_password, is_valid_username, not_empty, ValidationIssues,
    MIN_PASSWORD_LENGTH,
};

use crate::domain::entities::attachment::{categories, AttachmentRef, Visibility};
use crate::domain::entities::profile::{CustomerProfile, DriverProfile, RoleProfile};
use crate::domain::entities::user::{Role, User};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::identity::{IdentityRepository, UniquenessProbe};
use crate::services::credentials::PasswordHasher;
use crate::stores::attachment::AttachmentStore;
use crate::stores::token::{ConsumeOutcome, TokenStore};

use super::requests::{
    FilePayload, IdentitySnapshot, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use super::staged::StagedAttachments;

/// Drives the mutation pipeline over the identity repository, the token
/// store, the attachment store and the password hasher.
///
/// Every mutation follows the same stage order: validation and the advisory
/// uniqueness check run before any side effect, the verification token is
/// consumed next, attachments are staged after that, and the relational
/// write commits last. Any failure past staging compensates the staged
/// blobs before the error is returned.
pub struct MutationCoordinator<R, T, A, H>
where
    R: IdentityRepository,
    T: TokenStore,
    A: AttachmentStore + 'static,
    H: PasswordHasher,
{
    identities: Arc<R>,
    tokens: Arc<T>,
    attachments: Arc<A>,
    hasher: Arc<H>,
}

impl<R, T, A, H> MutationCoordinator<R, T, A, H>
where
    R: IdentityRepository,
    T: TokenStore,
    A: AttachmentStore + 'static,
    H: PasswordHasher,
{
    pub fn new(identities: Arc<R>, tokens: Arc<T>, attachments: Arc<A>, hasher: Arc<H>) -> Self {
        Self {
            identities,
            tokens,
            attachments,
            hasher,
        }
    }

    /// Create a new identity: user plus role profile, atomically.
    ///
    /// `allowed_roles` restricts which roles this call site may create; the
    /// staff endpoint passes admin and driver, the customer endpoint passes
    /// customer only. A role outside the set is rejected before any other
    /// check runs.
    pub async fn register(
        &self,
        allowed_roles: &[Role],
        request: RegisterRequest,
    ) -> DomainResult<IdentitySnapshot> {
        if !allowed_roles.contains(&request.role) {
            warn!(role = %request.role, "registration with disallowed role rejected");
            return Err(DomainError::RoleInvalid);
        }
        Self::validate_register(&request)?;

        let collisions = self
            .identities
            .check_unique(UniquenessProbe {
                username: Some(&request.username),
                email: Some(&request.email),
                phone: Some(&request.phone),
                excluding: None,
            })
            .await?;
        if let Some(field) = collisions.first() {
            return Err(DomainError::UniquenessConflict { field: *field });
        }

        self.consume_token(request.token.as_deref(), &request.phone)
            .await?;

        let mut staged = StagedAttachments::new(Arc::clone(&self.attachments));
        match self.register_staged(&mut staged, request).await {
            Ok(snapshot) => {
                staged.disarm();
                info!(
                    user_id = %snapshot.user.id,
                    role = %snapshot.user.role,
                    phone = %mask_phone(&snapshot.user.phone),
                    "identity registered"
                );
                Ok(snapshot)
            }
            Err(err) => {
                staged.compensate().await;
                Err(err)
            }
        }
    }

    /// Partially update an existing identity and its role profile.
    ///
    /// A verification token is demanded only when the request carries a
    /// phone that differs from the stored one. Attachments superseded by
    /// the update are deleted only after the relational commit; a failed
    /// update leaves the previously stored files untouched.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> DomainResult<IdentitySnapshot> {
        let user = self
            .identities
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let (profile, profile_is_new) = match self.identities.find_profile(user.id).await? {
            Some(profile) => (profile, false),
            None => (RoleProfile::bare_for(user.role, user.id), true),
        };

        if request.is_noop() {
            return Ok(IdentitySnapshot { user, profile });
        }
        Self::validate_update(&user, &request)?;

        let probe = UniquenessProbe {
            username: request.username.as_deref().filter(|v| *v != user.username),
            email: request.email.as_deref().filter(|v| *v != user.email),
            phone: request.phone.as_deref().filter(|v| *v != user.phone),
            excluding: Some(user.id),
        };
        if probe.username.is_some() || probe.email.is_some() || probe.phone.is_some() {
            let collisions = self.identities.check_unique(probe).await?;
            if let Some(field) = collisions.first() {
                return Err(DomainError::UniquenessConflict { field: *field });
            }
        }

        // Changing the phone re-proves possession of the new number.
        if let Some(new_phone) = request.phone.as_deref().filter(|p| *p != user.phone) {
            self.consume_token(request.token.as_deref(), new_phone)
                .await?;
        }

        let mut staged = StagedAttachments::new(Arc::clone(&self.attachments));
        match self
            .update_staged(&mut staged, user, profile, profile_is_new, request)
            .await
        {
            Ok((snapshot, superseded)) => {
                staged.disarm();
                for old in superseded {
                    if let Err(err) = self.attachments.delete(&old).await {
                        warn!(
                            storage_key = %old.storage_key,
                            error = %err,
                            "superseded attachment not deleted"
                        );
                    }
                }
                info!(user_id = %snapshot.user.id, "identity updated");
                Ok(snapshot)
            }
            Err(err) => {
                staged.compensate().await;
                Err(err)
            }
        }
    }

    /// Replace the password of the account bound to a verified phone.
    ///
    /// The token is consumed before the account lookup, so a token spent on
    /// an unknown phone is gone either way.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> DomainResult<()> {
        let mut issues = ValidationIssues::new();
        if !is_valid_phone(&request.phone) {
            issues.add("phone", "The phone must be a valid local mobile number.");
        }
        if !is_valid_password(&request.password) {
            issues.add(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if !issues.is_empty() {
            return Err(DomainError::Validation {
                errors: issues.into_field_errors(),
            });
        }

        self.consume_token(Some(&request.token), &request.phone)
            .await?;

        let mut user = self
            .identities
            .find_by_phone(&request.phone)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        user.password_hash = self.hasher.hash(&request.password)?;
        user.touch();

        let mut tx = self.identities.begin().await?;
        if let Err(err) = self.identities.update_user(&mut tx, &user).await {
            let _ = self.identities.rollback(tx).await;
            return Err(err);
        }
        self.identities.commit(tx).await?;

        info!(phone = %mask_phone(&request.phone), "password reset");
        Ok(())
    }

    async fn register_staged(
        &self,
        staged: &mut StagedAttachments<A>,
        request: RegisterRequest,
    ) -> DomainResult<IdentitySnapshot> {
        let RegisterRequest {
            role,
            full_name,
            username,
            email,
            phone,
            password,
            address,
            job_title,
            profile_photo,
            id_photo_front,
            id_photo_back,
            driver_license,
            token: _,
        } = request;

        let profile_photo = self
            .stage_optional(staged, profile_photo, categories::PROFILE_PHOTOS, Visibility::Public)
            .await?;

        let password_hash = self.hasher.hash(&password)?;
        let user = User::new(full_name, username, email, phone, password_hash, role, address);

        let profile = if role.uses_driver_profile() {
            let driver_license = self
                .stage_optional(staged, driver_license, categories::DRIVER_LICENSE, Visibility::Private)
                .await?;
            RoleProfile::Driver(DriverProfile {
                user_id: user.id,
                driver_license,
                profile_photo,
                job_title: job_title
                    .or_else(|| (role == Role::Driver).then(|| "Driver".to_string())),
            })
        } else {
            let id_photo_front = self
                .stage_optional(staged, id_photo_front, categories::ID_PHOTOS_FRONT, Visibility::Private)
                .await?;
            let id_photo_back = self
                .stage_optional(staged, id_photo_back, categories::ID_PHOTOS_BACK, Visibility::Private)
                .await?;
            RoleProfile::Customer(CustomerProfile {
                user_id: user.id,
                id_photo_front,
                id_photo_back,
                profile_photo,
                // The phone was just proven via OTP; self-registration counts
                // as verified.
                is_verified: true,
            })
        };

        let mut tx = self.identities.begin().await?;
        if let Err(err) = self.identities.create_user(&mut tx, &user).await {
            let _ = self.identities.rollback(tx).await;
            return Err(err);
        }
        if let Err(err) = self.identities.create_role_profile(&mut tx, &profile).await {
            let _ = self.identities.rollback(tx).await;
            return Err(err);
        }
        self.identities.commit(tx).await?;

        Ok(IdentitySnapshot { user, profile })
    }

    async fn update_staged(
        &self,
        staged: &mut StagedAttachments<A>,
        mut user: User,
        mut profile: RoleProfile,
        profile_is_new: bool,
        request: UpdateProfileRequest,
    ) -> DomainResult<(IdentitySnapshot, Vec<AttachmentRef>)> {
        let mut superseded = Vec::new();

        match &mut profile {
            RoleProfile::Customer(p) => {
                if let Some(payload) = &request.profile_photo {
                    let fresh = self
                        .stage(staged, payload, categories::PROFILE_PHOTOS, Visibility::Public)
                        .await?;
                    superseded.extend(p.profile_photo.replace(fresh));
                }
                if let Some(payload) = &request.id_photo_front {
                    let fresh = self
                        .stage(staged, payload, categories::ID_PHOTOS_FRONT, Visibility::Private)
                        .await?;
                    superseded.extend(p.id_photo_front.replace(fresh));
                }
                if let Some(payload) = &request.id_photo_back {
                    let fresh = self
                        .stage(staged, payload, categories::ID_PHOTOS_BACK, Visibility::Private)
                        .await?;
                    superseded.extend(p.id_photo_back.replace(fresh));
                }
            }
            RoleProfile::Driver(p) => {
                if let Some(payload) = &request.profile_photo {
                    let fresh = self
                        .stage(staged, payload, categories::PROFILE_PHOTOS, Visibility::Public)
                        .await?;
                    superseded.extend(p.profile_photo.replace(fresh));
                }
                if let Some(payload) = &request.driver_license {
                    let fresh = self
                        .stage(staged, payload, categories::DRIVER_LICENSE, Visibility::Private)
                        .await?;
                    superseded.extend(p.driver_license.replace(fresh));
                }
                if let Some(title) = request.job_title.clone() {
                    p.job_title = Some(title);
                }
            }
        }

        if let Some(v) = request.full_name {
            user.full_name = v;
        }
        if let Some(v) = request.username {
            user.username = v;
        }
        if let Some(v) = request.email {
            user.email = v;
        }
        if let Some(v) = request.phone {
            user.phone = v;
        }
        if let Some(v) = request.password {
            user.password_hash = self.hasher.hash(&v)?;
        }
        if let Some(v) = request.address {
            user.address = v;
        }
        user.touch();

        let mut tx = self.identities.begin().await?;
        if let Err(err) = self.identities.update_user(&mut tx, &user).await {
            let _ = self.identities.rollback(tx).await;
            return Err(err);
        }
        let profile_write = if profile_is_new {
            self.identities.create_role_profile(&mut tx, &profile).await
        } else {
            self.identities.update_role_profile(&mut tx, &profile).await
        };
        if let Err(err) = profile_write {
            let _ = self.identities.rollback(tx).await;
            return Err(err);
        }
        self.identities.commit(tx).await?;

        Ok((IdentitySnapshot { user, profile }, superseded))
    }

    async fn stage(
        &self,
        staged: &mut StagedAttachments<A>,
        payload: &FilePayload,
        category: &'static str,
        visibility: Visibility,
    ) -> DomainResult<AttachmentRef> {
        debug!(category, filename = %payload.filename, "staging attachment");
        let attachment = self
            .attachments
            .store(&payload.bytes, category, visibility)
            .await?;
        staged.push(attachment.clone());
        Ok(attachment)
    }

    async fn stage_optional(
        &self,
        staged: &mut StagedAttachments<A>,
        payload: Option<FilePayload>,
        category: &'static str,
        visibility: Visibility,
    ) -> DomainResult<Option<AttachmentRef>> {
        match payload {
            Some(payload) => Ok(Some(self.stage(staged, &payload, category, visibility).await?)),
            None => Ok(None),
        }
    }

    async fn consume_token(&self, token: Option<&str>, phone: &str) -> DomainResult<()> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                warn!(phone = %mask_phone(phone), "mutation attempted without a verification token");
                return Err(DomainError::TokenInvalidOrExpired);
            }
        };
        match self.tokens.consume(token, phone).await? {
            ConsumeOutcome::Consumed => Ok(()),
            ConsumeOutcome::Invalid => {
                warn!(phone = %mask_phone(phone), "verification token invalid or expired");
                Err(DomainError::TokenInvalidOrExpired)
            }
            ConsumeOutcome::PhoneMismatch => {
                warn!(phone = %mask_phone(phone), "verification token bound to another phone");
                Err(DomainError::TokenPhoneMismatch)
            }
        }
    }

    fn validate_register(request: &RegisterRequest) -> DomainResult<()> {
        let mut issues = ValidationIssues::new();
        if !not_empty(&request.full_name) {
            issues.add("full_name", "The full name field is required.");
        }
        if !is_valid_username(&request.username) {
            issues.add("username", "The username format is invalid.");
        }
        if !is_valid_email(&request.email) {
            issues.add("email", "The email must be a valid email address.");
        }
        if !is_valid_phone(&request.phone) {
            issues.add("phone", "The phone must be a valid local mobile number.");
        }
        if !is_valid_password(&request.password) {
            issues.add(
                "password",
                format!("The password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if request.role.uses_driver_profile() {
            if request.id_photo_front.is_some() || request.id_photo_back.is_some() {
                issues.add("id_photo_front", "ID photos do not apply to staff accounts.");
            }
        } else {
            if request.driver_license.is_some() {
                issues.add("driver_license", "A driver license does not apply to customer accounts.");
            }
            if request.job_title.is_some() {
                issues.add("job_title", "A job title does not apply to customer accounts.");
            }
            if request.id_photo_front.is_none() {
                issues.add("id_photo_front", "The ID photo front field is required.");
            }
            if request.id_photo_back.is_none() {
                issues.add("id_photo_back", "The ID photo back field is required.");
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation {
                errors: issues.into_field_errors(),
            })
        }
    }

    fn validate_update(user: &User, request: &UpdateProfileRequest) -> DomainResult<()> {
        let mut issues = ValidationIssues::new();
        if let Some(v) = &request.full_name {
            if !not_empty(v) {
                issues.add("full_name", "The full name may not be empty.");
            }
        }
        if let Some(v) = &request.username {
            if !is_valid_username(v) {
                issues.add("username", "The username format is invalid.");
            }
        }
        if let Some(v) = &request.email {
            if !is_valid_email(v) {
                issues.add("email", "The email must be a valid email address.");
            }
        }
        if let Some(v) = &request.phone {
            if !is_valid_phone(v) {
                issues.add("phone", "The phone must be a valid local mobile number.");
            }
        }
        if let Some(v) = &request.password {
            if !is_valid_password(v) {
                issues.add(
                    "password",
                    format!("The password must be at least {MIN_PASSWORD_LENGTH} characters."),
                );
            }
        }
        if user.role.uses_driver_profile() {
            if request.id_photo_front.is_some() || request.id_photo_back.is_some() {
                issues.add("id_photo_front", "ID photos do not apply to staff accounts.");
            }
        } else {
            if request.driver_license.is_some() {
                issues.add("driver_license", "A driver license does not apply to customer accounts.");
            }
            if request.job_title.is_some() {
                issues.add("job_title", "A job title does not apply to customer accounts.");
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation {
                errors: issues.into_field_errors(),
            })
        }
    }
}
