//! In-memory identity repository.
//!
//! Implements the full transactional contract against process memory. Staged
//! writes are buffered in the transaction handle and applied under a single
//! write lock at commit, which is also where uniqueness is decided: of two
//! racing commits staging the same username, exactly one wins and the other
//! gets `UniquenessConflict` with nothing applied.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::profile::RoleProfile;
use crate::domain::entities::user::User;
use crate::errors::{DomainError, DomainResult, UniqueField};

use super::r#trait::{IdentityRepository, UniquenessProbe};

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, RoleProfile>,
}

#[derive(Debug, Clone)]
enum StagedOp {
    CreateUser(User),
    CreateProfile(RoleProfile),
    UpdateUser(User),
    UpdateProfile(RoleProfile),
}

/// Transaction handle buffering staged writes until commit
#[derive(Debug, Default)]
pub struct InMemoryTx {
    ops: Vec<StagedOp>,
}

/// In-memory implementation of [`IdentityRepository`]
///
/// The production counterpart is the MySQL repository in the infra crate;
/// this one backs tests and local development without a database.
#[derive(Clone, Default)]
pub struct InMemoryIdentityRepository {
    state: Arc<RwLock<StoreState>>,
    fail_commits: Arc<AtomicBool>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every subsequent commit to fail, for exercising failure paths
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of committed users
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Number of committed role profiles
    pub async fn profile_count(&self) -> usize {
        self.state.read().await.profiles.len()
    }

    fn conflicts_in(
        state: &StoreState,
        probe: UniquenessProbe<'_>,
    ) -> Vec<UniqueField> {
        let mut conflicts = Vec::new();
        for user in state.users.values() {
            if probe.excluding == Some(user.id) {
                continue;
            }
            if probe.username == Some(user.username.as_str()) {
                conflicts.push(UniqueField::Username);
            }
            if probe.email == Some(user.email.as_str()) {
                conflicts.push(UniqueField::Email);
            }
            if probe.phone == Some(user.phone.as_str()) {
                conflicts.push(UniqueField::Phone);
            }
        }
        conflicts.sort_by_key(|f| f.as_str());
        conflicts.dedup();
        conflicts
    }

    /// Validate one staged op against committed state plus earlier staged ops
    fn check_op(state: &StoreState, op: &StagedOp) -> DomainResult<()> {
        match op {
            StagedOp::CreateUser(user) | StagedOp::UpdateUser(user) => {
                let probe = UniquenessProbe {
                    username: Some(&user.username),
                    email: Some(&user.email),
                    phone: Some(&user.phone),
                    excluding: Some(user.id),
                };
                if let Some(field) = Self::conflicts_in(state, probe).into_iter().next() {
                    return Err(DomainError::UniquenessConflict { field });
                }
                Ok(())
            }
            StagedOp::CreateProfile(profile) => {
                if state.profiles.contains_key(&profile.user_id()) {
                    return Err(DomainError::Persistence {
                        message: format!(
                            "role profile already exists for user {}",
                            profile.user_id()
                        ),
                    });
                }
                Ok(())
            }
            StagedOp::UpdateProfile(_) => Ok(()),
        }
    }

    fn apply_op(state: &mut StoreState, op: StagedOp) {
        match op {
            StagedOp::CreateUser(user) | StagedOp::UpdateUser(user) => {
                state.users.insert(user.id, user);
            }
            StagedOp::CreateProfile(profile) | StagedOp::UpdateProfile(profile) => {
                state.profiles.insert(profile.user_id(), profile);
            }
        }
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    type Tx = InMemoryTx;

    async fn begin(&self) -> DomainResult<InMemoryTx> {
        Ok(InMemoryTx::default())
    }

    async fn commit(&self, tx: InMemoryTx) -> DomainResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence {
                message: "commit failed (injected)".to_string(),
            });
        }

        // Single write lock: validation and application are one atomic step.
        let mut state = self.state.write().await;
        let mut scratch = StoreState {
            users: state.users.clone(),
            profiles: state.profiles.clone(),
        };
        for op in &tx.ops {
            Self::check_op(&scratch, op)?;
            Self::apply_op(&mut scratch, op.clone());
        }
        *state = scratch;
        Ok(())
    }

    async fn rollback(&self, tx: InMemoryTx) -> DomainResult<()> {
        drop(tx);
        Ok(())
    }

    async fn create_user(&self, tx: &mut InMemoryTx, user: &User) -> DomainResult<()> {
        tx.ops.push(StagedOp::CreateUser(user.clone()));
        Ok(())
    }

    async fn create_role_profile(
        &self,
        tx: &mut InMemoryTx,
        profile: &RoleProfile,
    ) -> DomainResult<()> {
        tx.ops.push(StagedOp::CreateProfile(profile.clone()));
        Ok(())
    }

    async fn update_user(&self, tx: &mut InMemoryTx, user: &User) -> DomainResult<()> {
        tx.ops.push(StagedOp::UpdateUser(user.clone()));
        Ok(())
    }

    async fn update_role_profile(
        &self,
        tx: &mut InMemoryTx,
        profile: &RoleProfile,
    ) -> DomainResult<()> {
        tx.ops.push(StagedOp::UpdateProfile(profile.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.phone == phone).cloned())
    }

    async fn find_profile(&self, user_id: Uuid) -> DomainResult<Option<RoleProfile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn check_unique(&self, probe: UniquenessProbe<'_>) -> DomainResult<Vec<UniqueField>> {
        let state = self.state.read().await;
        Ok(Self::conflicts_in(&state, probe))
    }
}
