//! Account read side and credential-based login.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use sd_shared::utils::phone::mask_phone;

use crate::domain::entities::profile::RoleProfile;
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::identity::IdentityRepository;
use crate::services::credentials::PasswordHasher;
use crate::services::session::{SessionIssuer, SessionToken};
use crate::stores::attachment::AttachmentStore;

/// A user, its role profile and the resolved public profile photo URL.
///
/// Private attachments never resolve to URLs; the view carries their refs
/// as-is.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityView {
    pub user: User,
    pub profile: RoleProfile,
    pub profile_photo_url: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: User,
    pub session: SessionToken,
}

/// Login and identity lookups over the repository, the attachment store
/// and the session issuer.
pub struct AccountService<R, A, H, S>
where
    R: IdentityRepository,
    A: AttachmentStore,
    H: PasswordHasher,
    S: SessionIssuer,
{
    identities: Arc<R>,
    attachments: Arc<A>,
    hasher: Arc<H>,
    sessions: Arc<S>,
}

impl<R, A, H, S> AccountService<R, A, H, S>
where
    R: IdentityRepository,
    A: AttachmentStore,
    H: PasswordHasher,
    S: SessionIssuer,
{
    pub fn new(identities: Arc<R>, attachments: Arc<A>, hasher: Arc<H>, sessions: Arc<S>) -> Self {
        Self {
            identities,
            attachments,
            hasher,
            sessions,
        }
    }

    /// Staff login with username and password.
    ///
    /// Customer accounts do not exist from this entry point's perspective.
    pub async fn login_staff(&self, username: &str, password: &str) -> DomainResult<LoginOutcome> {
        let user = self
            .identities
            .find_by_username(username)
            .await?
            .filter(|u| u.is_staff())
            .ok_or(DomainError::UserNotFound)?;
        self.login_checked(user, password).await
    }

    /// Customer login with phone and password.
    pub async fn login_customer(&self, phone: &str, password: &str) -> DomainResult<LoginOutcome> {
        let user = self
            .identities
            .find_by_phone(phone)
            .await?
            .filter(|u| u.is_customer())
            .ok_or(DomainError::UserNotFound)?;
        self.login_checked(user, password).await
    }

    async fn login_checked(&self, user: User, password: &str) -> DomainResult<LoginOutcome> {
        if !user.is_active {
            warn!(user_id = %user.id, "login attempt on inactive account");
            return Err(DomainError::AccountInactive);
        }
        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(
                user_id = %user.id,
                phone = %mask_phone(&user.phone),
                "login with wrong password"
            );
            return Err(DomainError::InvalidCredentials);
        }
        let session = self.sessions.issue(user.id, user.role)?;
        info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(LoginOutcome { user, session })
    }

    /// The authenticated identity with its role profile.
    ///
    /// Reads never create a profile; a user row without one is surfaced as
    /// `ProfileNotFound`.
    pub async fn fetch_identity(&self, user_id: Uuid) -> DomainResult<IdentityView> {
        let user = self
            .identities
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        let profile = self
            .identities
            .find_profile(user.id)
            .await?
            .ok_or(DomainError::ProfileNotFound)?;

        let profile_photo_url = match &profile {
            RoleProfile::Customer(p) => p.profile_photo.as_ref(),
            RoleProfile::Driver(p) => p.profile_photo.as_ref(),
        }
        .and_then(|photo| self.attachments.resolve_url(photo));

        Ok(IdentityView {
            user,
            profile,
            profile_photo_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::entities::attachment::{categories, Visibility};
    use crate::domain::entities::profile::{CustomerProfile, DriverProfile};
    use crate::domain::entities::user::Role;
    use crate::repositories::identity::InMemoryIdentityRepository;
    use crate::stores::attachment::InMemoryAttachmentStore;

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> DomainResult<String> {
            Ok(format!("hashed:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, hash: &str) -> DomainResult<bool> {
            Ok(hash == format!("hashed:{plaintext}"))
        }
    }

    struct FakeSessions;

    impl SessionIssuer for FakeSessions {
        fn issue(&self, subject: Uuid, _role: Role) -> DomainResult<SessionToken> {
            Ok(SessionToken {
                token: format!("session-for-{subject}"),
                expires_in: 3600,
            })
        }

        fn authenticate(&self, token: &str) -> DomainResult<(Uuid, Role)> {
            token
                .strip_prefix("session-for-")
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(|id| (id, Role::Customer))
                .ok_or(DomainError::Unauthenticated)
        }
    }

    type Service =
        AccountService<InMemoryIdentityRepository, InMemoryAttachmentStore, PlainHasher, FakeSessions>;

    struct Harness {
        identities: Arc<InMemoryIdentityRepository>,
        attachments: Arc<InMemoryAttachmentStore>,
        service: Service,
    }

    fn harness() -> Harness {
        let identities = Arc::new(InMemoryIdentityRepository::new());
        let attachments = Arc::new(InMemoryAttachmentStore::new());
        let service = AccountService::new(
            Arc::clone(&identities),
            Arc::clone(&attachments),
            Arc::new(PlainHasher),
            Arc::new(FakeSessions),
        );
        Harness {
            identities,
            attachments,
            service,
        }
    }

    async fn seed(h: &Harness, role: Role, with_profile: bool) -> User {
        let user = User::new(
            "Abebe Bikila".to_string(),
            "abebe".to_string(),
            "abebe@example.com".to_string(),
            "0911111111".to_string(),
            "hashed:secret-pw".to_string(),
            role,
            None,
        );
        let mut tx = h.identities.begin().await.unwrap();
        h.identities.create_user(&mut tx, &user).await.unwrap();
        if with_profile {
            let profile = RoleProfile::bare_for(role, user.id);
            h.identities
                .create_role_profile(&mut tx, &profile)
                .await
                .unwrap();
        }
        h.identities.commit(tx).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_staff_login_issues_session() {
        let h = harness();
        let user = seed(&h, Role::Driver, true).await;

        let outcome = h.service.login_staff("abebe", "secret-pw").await.unwrap();
        assert_eq!(outcome.user.id, user.id);
        assert_eq!(outcome.session.token, format!("session-for-{}", user.id));
    }

    #[tokio::test]
    async fn test_staff_login_rejects_customers() {
        let h = harness();
        seed(&h, Role::Customer, true).await;

        let err = h
            .service
            .login_staff("abebe", "secret-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound));
    }

    #[tokio::test]
    async fn test_customer_login_by_phone() {
        let h = harness();
        seed(&h, Role::Customer, true).await;

        let outcome = h
            .service
            .login_customer("0911111111", "secret-pw")
            .await
            .unwrap();
        assert!(outcome.user.is_customer());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let h = harness();
        seed(&h, Role::Admin, true).await;

        let err = h.service.login_staff("abebe", "wrong").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let h = harness();
        let mut user = seed(&h, Role::Driver, true).await;
        user.is_active = false;
        let mut tx = h.identities.begin().await.unwrap();
        h.identities.update_user(&mut tx, &user).await.unwrap();
        h.identities.commit(tx).await.unwrap();

        let err = h
            .service
            .login_staff("abebe", "secret-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AccountInactive));
    }

    #[tokio::test]
    async fn test_fetch_identity_resolves_public_photo_only() {
        let h = harness();
        let user = seed(&h, Role::Customer, false).await;

        let photo = h
            .attachments
            .store(&[1, 2], categories::PROFILE_PHOTOS, Visibility::Public)
            .await
            .unwrap();
        let id_front = h
            .attachments
            .store(&[3, 4], categories::ID_PHOTOS_FRONT, Visibility::Private)
            .await
            .unwrap();
        let photo_key = photo.storage_key.clone();
        let profile = RoleProfile::Customer(CustomerProfile {
            user_id: user.id,
            id_photo_front: Some(id_front.clone()),
            id_photo_back: None,
            profile_photo: Some(photo),
            is_verified: true,
        });
        let mut tx = h.identities.begin().await.unwrap();
        h.identities
            .create_role_profile(&mut tx, &profile)
            .await
            .unwrap();
        h.identities.commit(tx).await.unwrap();

        let view = h.service.fetch_identity(user.id).await.unwrap();
        let url = view.profile_photo_url.expect("public photo resolves");
        assert!(url.ends_with(&photo_key));
        // The private ID photo never resolves to a URL.
        assert!(h.attachments.resolve_url(&id_front).is_none());
    }

    #[tokio::test]
    async fn test_fetch_identity_without_profile() {
        let h = harness();
        let user = seed(&h, Role::Driver, false).await;

        let err = h.service.fetch_identity(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::ProfileNotFound));
    }

    #[tokio::test]
    async fn test_fetch_identity_driver_view() {
        let h = harness();
        let user = seed(&h, Role::Admin, false).await;
        let profile = RoleProfile::Driver(DriverProfile {
            user_id: user.id,
            driver_license: None,
            profile_photo: None,
            job_title: Some("Fleet Admin".to_string()),
        });
        let mut tx = h.identities.begin().await.unwrap();
        h.identities
            .create_role_profile(&mut tx, &profile)
            .await
            .unwrap();
        h.identities.commit(tx).await.unwrap();

        let view = h.service.fetch_identity(user.id).await.unwrap();
        assert!(view.profile_photo_url.is_none());
        assert!(view.profile.matches_role(Role::Admin));
    }
}
