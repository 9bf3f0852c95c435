//! Coordinator pipeline tests over the in-memory collaborators.

use std::sync::Arc;

use crate::domain::entities::profile::RoleProfile;
use crate::domain::entities::user::{Role, User};
use crate::domain::entities::verification_token::VerificationToken;
use crate::errors::{DomainError, DomainResult, UniqueField};
use crate::repositories::identity::{IdentityRepository, InMemoryIdentityRepository};
use crate::services::credentials::PasswordHasher;
use crate::stores::attachment::InMemoryAttachmentStore;
use crate::stores::token::{InMemoryTokenStore, TokenStore};

use super::{
    FilePayload, MutationCoordinator, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        Ok(format!("hashed:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> DomainResult<bool> {
        Ok(hash == format!("hashed:{plaintext}"))
    }
}

type TestCoordinator = MutationCoordinator<
    InMemoryIdentityRepository,
    InMemoryTokenStore,
    InMemoryAttachmentStore,
    PlainHasher,
>;

struct Harness {
    identities: Arc<InMemoryIdentityRepository>,
    tokens: Arc<InMemoryTokenStore>,
    attachments: Arc<InMemoryAttachmentStore>,
    coordinator: Arc<TestCoordinator>,
}

fn harness() -> Harness {
    let identities = Arc::new(InMemoryIdentityRepository::new());
    let tokens = Arc::new(InMemoryTokenStore::new());
    let attachments = Arc::new(InMemoryAttachmentStore::new());
    let coordinator = Arc::new(MutationCoordinator::new(
        Arc::clone(&identities),
        Arc::clone(&tokens),
        Arc::clone(&attachments),
        Arc::new(PlainHasher),
    ));
    Harness {
        identities,
        tokens,
        attachments,
        coordinator,
    }
}

const CUSTOMER_PHONE: &str = "0911111111";
const STAFF_PHONE: &str = "0922222222";

fn customer_request(token: Option<String>) -> RegisterRequest {
    RegisterRequest {
        role: Role::Customer,
        full_name: "Abebe Bikila".to_string(),
        username: "abebe".to_string(),
        email: "abebe@example.com".to_string(),
        phone: CUSTOMER_PHONE.to_string(),
        password: "correct-horse".to_string(),
        address: Some("Bole, Addis Ababa".to_string()),
        token,
        job_title: None,
        profile_photo: None,
        id_photo_front: Some(FilePayload::new("front.jpg", vec![1, 2, 3])),
        id_photo_back: Some(FilePayload::new("back.jpg", vec![4, 5, 6])),
        driver_license: None,
    }
}

fn driver_request(token: Option<String>) -> RegisterRequest {
    RegisterRequest {
        role: Role::Driver,
        full_name: "Sara Tesfaye".to_string(),
        username: "sara_t".to_string(),
        email: "sara@example.com".to_string(),
        phone: STAFF_PHONE.to_string(),
        password: "correct-horse".to_string(),
        address: None,
        token,
        job_title: None,
        profile_photo: Some(FilePayload::new("sara.jpg", vec![9])),
        id_photo_front: None,
        id_photo_back: None,
        driver_license: Some(FilePayload::new("license.jpg", vec![7, 8])),
    }
}

#[tokio::test]
async fn test_register_customer_persists_user_and_profile() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    let snapshot = h
        .coordinator
        .register(&[Role::Customer], customer_request(Some(token)))
        .await
        .unwrap();

    assert_eq!(snapshot.user.role, Role::Customer);
    assert_eq!(snapshot.user.password_hash, "hashed:correct-horse");
    match &snapshot.profile {
        RoleProfile::Customer(p) => {
            assert!(p.is_verified);
            assert!(p.id_photo_front.is_some());
            assert!(p.id_photo_back.is_some());
        }
        other => panic!("expected customer profile, got {other:?}"),
    }

    assert_eq!(h.identities.user_count().await, 1);
    assert_eq!(h.identities.profile_count().await, 1);
    assert_eq!(h.attachments.len(), 2);
    // The token is single-use and was consumed by the registration.
    assert!(h.tokens.is_empty());
}

#[tokio::test]
async fn test_register_defaults_driver_job_title() {
    let h = harness();
    let token = h.tokens.issue(STAFF_PHONE).await.unwrap();

    let snapshot = h
        .coordinator
        .register(&[Role::Admin, Role::Driver], driver_request(Some(token)))
        .await
        .unwrap();

    match &snapshot.profile {
        RoleProfile::Driver(p) => {
            assert_eq!(p.job_title.as_deref(), Some("Driver"));
            assert!(p.driver_license.is_some());
            assert!(!p.driver_license.as_ref().unwrap().is_public());
        }
        other => panic!("expected driver profile, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_disallowed_role_has_no_side_effects() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    let err = h
        .coordinator
        .register(&[Role::Admin, Role::Driver], customer_request(Some(token)))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::RoleInvalid));
    assert_eq!(h.identities.user_count().await, 0);
    assert!(h.attachments.is_empty());
    // Rejected before the token check, so the token survives.
    assert_eq!(h.tokens.len(), 1);
}

#[tokio::test]
async fn test_register_validation_runs_before_token_consumption() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    let mut request = customer_request(Some(token));
    request.email = "not-an-email".to_string();

    let err = h
        .coordinator
        .register(&[Role::Customer], request)
        .await
        .unwrap_err();

    match err {
        DomainError::Validation { errors } => assert!(errors.contains_key("email")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.tokens.len(), 1);
    assert!(h.attachments.is_empty());
}

#[tokio::test]
async fn test_register_without_token_is_rejected() {
    let h = harness();

    let err = h
        .coordinator
        .register(&[Role::Customer], customer_request(None))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::TokenInvalidOrExpired));
    assert_eq!(h.identities.user_count().await, 0);
}

#[tokio::test]
async fn test_register_token_bound_to_other_phone_survives() {
    let h = harness();
    let token = h.tokens.issue(STAFF_PHONE).await.unwrap();

    let err = h
        .coordinator
        .register(&[Role::Customer], customer_request(Some(token.clone())))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenPhoneMismatch));

    // The mismatch left the token unconsumed; the bound phone can still
    // use it.
    let mut request = driver_request(Some(token));
    request.role = Role::Driver;
    h.coordinator
        .register(&[Role::Driver], request)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_register_token_is_single_use() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    h.coordinator
        .register(&[Role::Customer], customer_request(Some(token.clone())))
        .await
        .unwrap();

    let mut second = customer_request(Some(token));
    second.username = "kebede".to_string();
    second.email = "kebede@example.com".to_string();
    second.phone = "0933333333".to_string();

    let err = h
        .coordinator
        .register(&[Role::Customer], second)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenInvalidOrExpired));
    assert_eq!(h.identities.user_count().await, 1);
}

#[tokio::test]
async fn test_register_expired_token_is_rejected() {
    let h = harness();
    let mut token = VerificationToken::issue("stale-token", CUSTOMER_PHONE);
    token.issued_at = chrono::Utc::now() - chrono::Duration::seconds(601);
    h.tokens.insert(token);

    let err = h
        .coordinator
        .register(
            &[Role::Customer],
            customer_request(Some("stale-token".to_string())),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenInvalidOrExpired));
}

#[tokio::test]
async fn test_register_duplicate_username_spares_the_token() {
    let h = harness();
    let first = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();
    h.coordinator
        .register(&[Role::Customer], customer_request(Some(first)))
        .await
        .unwrap();

    let second_token = h.tokens.issue("0933333333").await.unwrap();
    let mut second = customer_request(Some(second_token));
    second.email = "other@example.com".to_string();
    second.phone = "0933333333".to_string();

    let err = h
        .coordinator
        .register(&[Role::Customer], second)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::UniquenessConflict {
            field: UniqueField::Username
        }
    ));
    // Advisory uniqueness runs before the token check.
    assert_eq!(h.tokens.len(), 1);
    assert_eq!(h.identities.user_count().await, 1);
}

#[tokio::test]
async fn test_register_commit_failure_compensates_staged_blobs() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();
    h.identities.set_fail_commits(true);

    let err = h
        .coordinator
        .register(&[Role::Customer], customer_request(Some(token)))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Persistence { .. }));
    assert_eq!(h.identities.user_count().await, 0);
    assert_eq!(h.identities.profile_count().await, 0);
    // Both staged ID photos were deleted during compensation.
    assert!(h.attachments.is_empty());
}

#[tokio::test]
async fn test_register_blob_store_failure_leaves_no_rows() {
    let h = harness();
    let token = h.tokens.issue(STAFF_PHONE).await.unwrap();
    h.attachments.set_fail_stores(true);

    let err = h
        .coordinator
        .register(&[Role::Admin, Role::Driver], driver_request(Some(token)))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Storage { .. }));
    assert_eq!(h.identities.user_count().await, 0);
    assert!(h.attachments.is_empty());
}

#[tokio::test]
async fn test_concurrent_registration_one_winner() {
    let h = harness();
    let mut handles = Vec::new();
    for i in 0..8u32 {
        let coordinator = Arc::clone(&h.coordinator);
        let tokens = Arc::clone(&h.tokens);
        handles.push(tokio::spawn(async move {
            let phone = format!("09111122{i:02}");
            let token = tokens.issue(&phone).await.unwrap();
            let mut request = customer_request(Some(token));
            request.email = format!("racer{i}@example.com");
            request.phone = phone;
            coordinator.register(&[Role::Customer], request).await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(DomainError::UniquenessConflict {
                field: UniqueField::Username,
            }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(h.identities.user_count().await, 1);
    assert_eq!(h.identities.profile_count().await, 1);
}

async fn registered_customer(h: &Harness) -> User {
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();
    h.coordinator
        .register(&[Role::Customer], customer_request(Some(token)))
        .await
        .unwrap()
        .user
}

#[tokio::test]
async fn test_update_scalar_fields_without_token() {
    let h = harness();
    let user = registered_customer(&h).await;

    let snapshot = h
        .coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                full_name: Some("Abebe B. Demissie".to_string()),
                address: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(snapshot.user.full_name, "Abebe B. Demissie");
    // `Some(None)` clears the stored address.
    assert_eq!(snapshot.user.address, None);
    assert_eq!(snapshot.user.phone, CUSTOMER_PHONE);

    let stored = h.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.full_name, "Abebe B. Demissie");
}

#[tokio::test]
async fn test_update_noop_returns_current_state() {
    let h = harness();
    let user = registered_customer(&h).await;

    let snapshot = h
        .coordinator
        .update_profile(user.id, UpdateProfileRequest::default())
        .await
        .unwrap();
    assert_eq!(snapshot.user.id, user.id);
    assert_eq!(snapshot.user.updated_at, user.updated_at);
}

#[tokio::test]
async fn test_update_phone_change_requires_token() {
    let h = harness();
    let user = registered_customer(&h).await;

    let err = h
        .coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                phone: Some("0944444444".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenInvalidOrExpired));

    let stored = h.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.phone, CUSTOMER_PHONE);
}

#[tokio::test]
async fn test_update_phone_change_with_token_bound_to_new_phone() {
    let h = harness();
    let user = registered_customer(&h).await;
    let token = h.tokens.issue("0944444444").await.unwrap();

    let snapshot = h
        .coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                phone: Some("0944444444".to_string()),
                token: Some(token),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(snapshot.user.phone, "0944444444");
    assert!(h.tokens.is_empty());
}

#[tokio::test]
async fn test_update_same_phone_consumes_no_token() {
    let h = harness();
    let user = registered_customer(&h).await;
    h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    h.coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                phone: Some(CUSTOMER_PHONE.to_string()),
                full_name: Some("Same Phone".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Re-submitting the stored phone is not a change.
    assert_eq!(h.tokens.len(), 1);
}

#[tokio::test]
async fn test_update_replaces_photo_and_deletes_old_blob_after_commit() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();
    let mut request = customer_request(Some(token));
    request.profile_photo = Some(FilePayload::new("old.jpg", vec![1]));
    let snapshot = h
        .coordinator
        .register(&[Role::Customer], request)
        .await
        .unwrap();

    let old_key = match &snapshot.profile {
        RoleProfile::Customer(p) => {
            p.profile_photo.as_ref().unwrap().storage_key.clone()
        }
        other => panic!("expected customer profile, got {other:?}"),
    };

    let updated = h
        .coordinator
        .update_profile(
            snapshot.user.id,
            UpdateProfileRequest {
                profile_photo: Some(FilePayload::new("new.jpg", vec![2])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let new_key = match &updated.profile {
        RoleProfile::Customer(p) => {
            p.profile_photo.as_ref().unwrap().storage_key.clone()
        }
        other => panic!("expected customer profile, got {other:?}"),
    };

    assert_ne!(old_key, new_key);
    assert!(!h.attachments.contains(&old_key));
    assert!(h.attachments.contains(&new_key));
}

#[tokio::test]
async fn test_update_failure_compensates_new_blob_and_keeps_old() {
    let h = harness();
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();
    let mut request = customer_request(Some(token));
    request.profile_photo = Some(FilePayload::new("old.jpg", vec![1]));
    let snapshot = h
        .coordinator
        .register(&[Role::Customer], request)
        .await
        .unwrap();
    let old_key = match &snapshot.profile {
        RoleProfile::Customer(p) => {
            p.profile_photo.as_ref().unwrap().storage_key.clone()
        }
        other => panic!("expected customer profile, got {other:?}"),
    };
    let blobs_before = h.attachments.len();

    h.identities.set_fail_commits(true);
    let err = h
        .coordinator
        .update_profile(
            snapshot.user.id,
            UpdateProfileRequest {
                profile_photo: Some(FilePayload::new("new.jpg", vec![2])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence { .. }));

    // The new blob was compensated, the committed one is intact.
    assert!(h.attachments.contains(&old_key));
    assert_eq!(h.attachments.len(), blobs_before);
}

#[tokio::test]
async fn test_update_creates_missing_profile_lazily() {
    let h = harness();
    // A user row without its profile, as legacy data might hold.
    let user = User::new(
        "Mulu Ketema".to_string(),
        "mulu".to_string(),
        "mulu@example.com".to_string(),
        "0955555555".to_string(),
        "hashed:pw".to_string(),
        Role::Driver,
        None,
    );
    let mut tx = h.identities.begin().await.unwrap();
    h.identities.create_user(&mut tx, &user).await.unwrap();
    h.identities.commit(tx).await.unwrap();
    assert_eq!(h.identities.profile_count().await, 0);

    let snapshot = h
        .coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                job_title: Some("Senior Driver".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    match &snapshot.profile {
        RoleProfile::Driver(p) => {
            assert_eq!(p.job_title.as_deref(), Some("Senior Driver"));
        }
        other => panic!("expected driver profile, got {other:?}"),
    }
    assert_eq!(h.identities.profile_count().await, 1);
}

#[tokio::test]
async fn test_update_rejects_files_foreign_to_the_role() {
    let h = harness();
    let user = registered_customer(&h).await;

    let err = h
        .coordinator
        .update_profile(
            user.id,
            UpdateProfileRequest {
                driver_license: Some(FilePayload::new("license.jpg", vec![1])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    match err {
        DomainError::Validation { errors } => assert!(errors.contains_key("driver_license")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.attachments.len() == 2); // only the registration ID photos
}

#[tokio::test]
async fn test_update_unknown_user() {
    let h = harness();
    let err = h
        .coordinator
        .update_profile(uuid::Uuid::new_v4(), UpdateProfileRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound));
}

#[tokio::test]
async fn test_reset_password_rotates_hash() {
    let h = harness();
    let user = registered_customer(&h).await;
    let token = h.tokens.issue(CUSTOMER_PHONE).await.unwrap();

    h.coordinator
        .reset_password(ResetPasswordRequest {
            phone: CUSTOMER_PHONE.to_string(),
            password: "new-password".to_string(),
            token,
        })
        .await
        .unwrap();

    let stored = h.identities.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "hashed:new-password");
    assert!(h.tokens.is_empty());
}

#[tokio::test]
async fn test_reset_password_mismatched_token_keeps_it() {
    let h = harness();
    registered_customer(&h).await;
    let token = h.tokens.issue(STAFF_PHONE).await.unwrap();

    let err = h
        .coordinator
        .reset_password(ResetPasswordRequest {
            phone: CUSTOMER_PHONE.to_string(),
            password: "new-password".to_string(),
            token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenPhoneMismatch));
    assert_eq!(h.tokens.len(), 1);
}

#[tokio::test]
async fn test_reset_password_unknown_phone_still_burns_token() {
    let h = harness();
    let token = h.tokens.issue("0966666666").await.unwrap();

    let err = h
        .coordinator
        .reset_password(ResetPasswordRequest {
            phone: "0966666666".to_string(),
            password: "new-password".to_string(),
            token,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound));
    // Token consumption precedes the account lookup.
    assert!(h.tokens.is_empty());
}
