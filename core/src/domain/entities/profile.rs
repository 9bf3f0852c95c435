//! Role-specific profile extensions, one per user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attachment::AttachmentRef;
use super::user::Role;

/// Customer profile extension: ID photos, profile photo, verification flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Owning user
    pub user_id: Uuid,

    /// Private front-side ID photo
    pub id_photo_front: Option<AttachmentRef>,

    /// Private back-side ID photo
    pub id_photo_back: Option<AttachmentRef>,

    /// Public profile photo
    pub profile_photo: Option<AttachmentRef>,

    /// Whether the customer's identity documents have been verified
    pub is_verified: bool,
}

impl CustomerProfile {
    /// A bare profile with only the owning user set, used for lazy creation
    pub fn bare(user_id: Uuid) -> Self {
        Self {
            user_id,
            id_photo_front: None,
            id_photo_back: None,
            profile_photo: None,
            is_verified: false,
        }
    }
}

/// Driver profile extension: license scan, profile photo, job title
///
/// Admins share this shape; they are staff registered through the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    /// Owning user
    pub user_id: Uuid,

    /// Private driver license scan
    pub driver_license: Option<AttachmentRef>,

    /// Public profile photo
    pub profile_photo: Option<AttachmentRef>,

    /// Job title within the fleet
    pub job_title: Option<String>,
}

impl DriverProfile {
    /// A bare profile with only the owning user set, used for lazy creation
    pub fn bare(user_id: Uuid) -> Self {
        Self {
            user_id,
            driver_license: None,
            profile_photo: None,
            job_title: None,
        }
    }
}

/// The role-specific extension record attached 1:1 to a User
///
/// Exactly one variant exists per user, matching the user's role. A user is
/// never persisted without its matching profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RoleProfile {
    Customer(CustomerProfile),
    Driver(DriverProfile),
}

impl RoleProfile {
    /// A bare profile matching the given role, used for lazy creation
    pub fn bare_for(role: Role, user_id: Uuid) -> Self {
        if role.uses_driver_profile() {
            RoleProfile::Driver(DriverProfile::bare(user_id))
        } else {
            RoleProfile::Customer(CustomerProfile::bare(user_id))
        }
    }

    /// Owning user id
    pub fn user_id(&self) -> Uuid {
        match self {
            RoleProfile::Customer(p) => p.user_id,
            RoleProfile::Driver(p) => p.user_id,
        }
    }

    /// Whether this variant matches the given role
    pub fn matches_role(&self, role: Role) -> bool {
        match self {
            RoleProfile::Customer(_) => role == Role::Customer,
            RoleProfile::Driver(_) => role.uses_driver_profile(),
        }
    }

    /// All attachment refs currently carried by the profile
    pub fn attachment_refs(&self) -> Vec<&AttachmentRef> {
        match self {
            RoleProfile::Customer(p) => [&p.id_photo_front, &p.id_photo_back, &p.profile_photo]
                .into_iter()
                .flatten()
                .collect(),
            RoleProfile::Driver(p) => [&p.driver_license, &p.profile_photo]
                .into_iter()
                .flatten()
                .collect(),
        }
    }
}
