//! Identity repository trait defining transactional user/profile persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::profile::RoleProfile;
use crate::domain::entities::user::User;
use crate::errors::{DomainResult, UniqueField};

/// Advisory uniqueness probe: which values to check, and which user to ignore
///
/// Used by the coordinator before staging side effects to reduce round trips.
/// The result is never the final arbiter; a concurrent collision still
/// surfaces as `UniquenessConflict` at commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessProbe<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    /// Existing user whose own values do not count as collisions
    pub excluding: Option<Uuid>,
}

/// Repository contract for User and RoleProfile persistence
///
/// Mutating operations participate in a caller-controlled transaction scope:
/// `begin` opens it, every write takes the transaction handle, and `commit`
/// or `rollback` closes it. A transaction that is dropped without commit has
/// no effect. Uniqueness of username/email/phone is enforced by the storage
/// layer itself and surfaces as `UniquenessConflict`.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Transaction handle type
    type Tx: Send;

    /// Open a transaction scope
    async fn begin(&self) -> DomainResult<Self::Tx>;

    /// Commit the transaction, making all staged writes durable atomically
    async fn commit(&self, tx: Self::Tx) -> DomainResult<()>;

    /// Discard the transaction and all staged writes
    async fn rollback(&self, tx: Self::Tx) -> DomainResult<()>;

    /// Stage creation of a new user
    async fn create_user(&self, tx: &mut Self::Tx, user: &User) -> DomainResult<()>;

    /// Stage creation of a role profile; at most one may exist per user
    async fn create_role_profile(
        &self,
        tx: &mut Self::Tx,
        profile: &RoleProfile,
    ) -> DomainResult<()>;

    /// Stage an update of an existing user
    async fn update_user(&self, tx: &mut Self::Tx, user: &User) -> DomainResult<()>;

    /// Stage an update of an existing role profile
    async fn update_role_profile(
        &self,
        tx: &mut Self::Tx,
        profile: &RoleProfile,
    ) -> DomainResult<()>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Find a user by phone
    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<User>>;

    /// Find the role profile belonging to a user
    async fn find_profile(&self, user_id: Uuid) -> DomainResult<Option<RoleProfile>>;

    /// Advisory check: which probed unique fields already collide
    async fn check_unique(&self, probe: UniquenessProbe<'_>) -> DomainResult<Vec<UniqueField>>;
}
