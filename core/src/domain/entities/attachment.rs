//! Attachment references pointing into the blob store.

use serde::{Deserialize, Serialize};

/// Visibility class of a stored blob
///
/// Visibility is the single source of truth: a URL can only ever be derived
/// for `Public` refs, and it is derived from the storage key, never by
/// string surgery on a previously derived URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Externally resolvable via a stable URL
    Public,
    /// Never exposed through a URL
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Opaque handle to a stored blob plus its visibility classification
///
/// A ref written but never referenced by a committed identity record is an
/// orphan; the mutation pipeline deletes it during compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Opaque storage key within the blob store
    pub storage_key: String,

    /// Visibility class of the blob
    pub visibility: Visibility,

    /// Category namespace that owns this blob (e.g. `Profile_photos`)
    pub owning_field: String,
}

impl AttachmentRef {
    pub fn new(
        storage_key: impl Into<String>,
        visibility: Visibility,
        owning_field: impl Into<String>,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            visibility,
            owning_field: owning_field.into(),
        }
    }

    /// Whether a URL may be derived for this ref
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// Category namespaces used by the mutation pipeline
pub mod categories {
    /// Public profile photos
    pub const PROFILE_PHOTOS: &str = "Profile_photos";
    /// Private front-side ID photos
    pub const ID_PHOTOS_FRONT: &str = "ID_photos_front";
    /// Private back-side ID photos
    pub const ID_PHOTOS_BACK: &str = "ID_photos_back";
    /// Private driver license scans
    pub const DRIVER_LICENSE: &str = "Driver_License";
}
