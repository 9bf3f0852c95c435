//! Request and response types for the mutation pipeline.

use serde::{Deserialize, Serialize};

use crate::domain::entities::profile::RoleProfile;
use crate::domain::entities::user::{Role, User};

/// An uploaded file, already decoded to raw bytes by the transport layer.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original filename as supplied by the client. Used only for
    /// diagnostics; storage keys are generated server-side.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Input for creating a new identity.
///
/// `token` is the single-use verification token previously issued for
/// `phone`. Which file fields are meaningful depends on `role`: customers
/// carry ID photos, drivers and admins carry a driver licence.
#[derive(Debug)]
pub struct RegisterRequest {
    pub role: Role,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: Option<String>,
    pub token: Option<String>,
    pub job_title: Option<String>,
    pub profile_photo: Option<FilePayload>,
    pub id_photo_front: Option<FilePayload>,
    pub id_photo_back: Option<FilePayload>,
    pub driver_license: Option<FilePayload>,
}

/// Partial update of an existing identity.
///
/// `None` means "leave unchanged". `address` uses a double `Option` so a
/// client can distinguish "unchanged" (`None`) from "clear the stored
/// address" (`Some(None)`). A token is required only when `phone` is
/// present and differs from the stored value.
#[derive(Debug, Default)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<Option<String>>,
    pub job_title: Option<String>,
    pub token: Option<String>,
    pub profile_photo: Option<FilePayload>,
    pub id_photo_front: Option<FilePayload>,
    pub id_photo_back: Option<FilePayload>,
    pub driver_license: Option<FilePayload>,
}

impl UpdateProfileRequest {
    /// True when the request carries at least one change.
    pub fn is_noop(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.address.is_none()
            && self.job_title.is_none()
            && self.profile_photo.is_none()
            && self.id_photo_front.is_none()
            && self.id_photo_back.is_none()
            && self.driver_license.is_none()
    }
}

/// Input for the forgotten-password flow. The token must be bound to
/// `phone`; the account is located by phone after the token is consumed.
#[derive(Debug)]
pub struct ResetPasswordRequest {
    pub phone: String,
    pub password: String,
    pub token: String,
}

/// A user together with its role profile, as returned by successful
/// mutations and by the read side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub user: User,
    pub profile: RoleProfile,
}
