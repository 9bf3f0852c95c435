//! MySQL implementation of the identity repository.
//!
//! Users and role profiles live in three tables: `users`,
//! `customer_profiles` and `driver_profiles`. Attachment columns store the
//! bare storage key; visibility and category are fixed per column and
//! restored on read. Uniqueness of username, email and phone is enforced by
//! unique indexes and surfaced as `UniquenessConflict` when an insert or
//! update trips one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use sd_core::domain::entities::attachment::{categories, AttachmentRef, Visibility};
use sd_core::domain::entities::profile::{CustomerProfile, DriverProfile, RoleProfile};
use sd_core::domain::entities::user::{Role, User};
use sd_core::errors::{DomainError, DomainResult, UniqueField};
use sd_core::repositories::identity::{IdentityRepository, UniquenessProbe};

/// MySQL-backed [`IdentityRepository`]
pub struct MySqlIdentityRepository {
    pool: MySqlPool,
}

impl MySqlIdentityRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &MySqlRow) -> DomainResult<User> {
        let id: String = get(row, "id")?;
        let role_str: String = get(row, "role")?;
        let role = Role::parse(&role_str).ok_or_else(|| DomainError::Persistence {
            message: format!("unknown role '{role_str}' in users row"),
        })?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Persistence {
                message: format!("invalid user id: {e}"),
            })?,
            full_name: get(row, "full_name")?,
            username: get(row, "username")?,
            email: get(row, "email")?,
            phone: get(row, "phone")?,
            password_hash: get(row, "password_hash")?,
            role,
            address: get(row, "address")?,
            is_active: get(row, "is_active")?,
            created_at: get::<DateTime<Utc>>(row, "created_at")?,
            updated_at: get::<DateTime<Utc>>(row, "updated_at")?,
        })
    }

    fn row_to_customer_profile(row: &MySqlRow) -> DomainResult<RoleProfile> {
        let user_id: String = get(row, "user_id")?;
        Ok(RoleProfile::Customer(CustomerProfile {
            user_id: parse_uuid(&user_id)?,
            id_photo_front: photo_ref(
                get(row, "id_photo_front")?,
                categories::ID_PHOTOS_FRONT,
                Visibility::Private,
            ),
            id_photo_back: photo_ref(
                get(row, "id_photo_back")?,
                categories::ID_PHOTOS_BACK,
                Visibility::Private,
            ),
            profile_photo: photo_ref(
                get(row, "profile_photo")?,
                categories::PROFILE_PHOTOS,
                Visibility::Public,
            ),
            is_verified: get(row, "is_verified")?,
        }))
    }

    fn row_to_driver_profile(row: &MySqlRow) -> DomainResult<RoleProfile> {
        let user_id: String = get(row, "user_id")?;
        Ok(RoleProfile::Driver(DriverProfile {
            user_id: parse_uuid(&user_id)?,
            driver_license: photo_ref(
                get(row, "driver_license")?,
                categories::DRIVER_LICENSE,
                Visibility::Private,
            ),
            profile_photo: photo_ref(
                get(row, "profile_photo")?,
                categories::PROFILE_PHOTOS,
                Visibility::Public,
            ),
            job_title: get(row, "job_title")?,
        }))
    }
}

fn get<'r, T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>>(
    row: &'r MySqlRow,
    column: &str,
) -> DomainResult<T> {
    row.try_get(column).map_err(|e| DomainError::Persistence {
        message: format!("failed to read column '{column}': {e}"),
    })
}

fn parse_uuid(value: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| DomainError::Persistence {
        message: format!("invalid uuid: {e}"),
    })
}

fn photo_ref(
    key: Option<String>,
    category: &'static str,
    visibility: Visibility,
) -> Option<AttachmentRef> {
    key.map(|k| AttachmentRef::new(k, visibility, category))
}

fn storage_key(attachment: &Option<AttachmentRef>) -> Option<&str> {
    attachment.as_ref().map(|a| a.storage_key.as_str())
}

/// Map a write error, recognizing unique index violations by index name
fn map_write_error(err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            let field = if message.contains("username") {
                UniqueField::Username
            } else if message.contains("email") {
                UniqueField::Email
            } else {
                UniqueField::Phone
            };
            return DomainError::UniquenessConflict { field };
        }
    }
    DomainError::Persistence {
        message: err.to_string(),
    }
}

#[async_trait]
impl IdentityRepository for MySqlIdentityRepository {
    type Tx = Transaction<'static, MySql>;

    async fn begin(&self) -> DomainResult<Self::Tx> {
        self.pool.begin().await.map_err(|e| DomainError::Persistence {
            message: format!("failed to begin transaction: {e}"),
        })
    }

    async fn commit(&self, tx: Self::Tx) -> DomainResult<()> {
        tx.commit().await.map_err(map_write_error)
    }

    async fn rollback(&self, tx: Self::Tx) -> DomainResult<()> {
        tx.rollback().await.map_err(|e| DomainError::Persistence {
            message: format!("failed to roll back transaction: {e}"),
        })
    }

    async fn create_user(&self, tx: &mut Self::Tx, user: &User) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, username, email, phone, password_hash,
                               role, address, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.address)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn create_role_profile(
        &self,
        tx: &mut Self::Tx,
        profile: &RoleProfile,
    ) -> DomainResult<()> {
        match profile {
            RoleProfile::Customer(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO customer_profiles
                        (user_id, id_photo_front, id_photo_back, profile_photo, is_verified)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(p.user_id.to_string())
                .bind(storage_key(&p.id_photo_front))
                .bind(storage_key(&p.id_photo_back))
                .bind(storage_key(&p.profile_photo))
                .bind(p.is_verified)
                .execute(&mut **tx)
                .await
                .map_err(map_write_error)?;
            }
            RoleProfile::Driver(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO driver_profiles
                        (user_id, driver_license, profile_photo, job_title)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(p.user_id.to_string())
                .bind(storage_key(&p.driver_license))
                .bind(storage_key(&p.profile_photo))
                .bind(&p.job_title)
                .execute(&mut **tx)
                .await
                .map_err(map_write_error)?;
            }
        }
        Ok(())
    }

    async fn update_user(&self, tx: &mut Self::Tx, user: &User) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = ?, username = ?, email = ?, phone = ?,
                password_hash = ?, address = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.address)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    async fn update_role_profile(
        &self,
        tx: &mut Self::Tx,
        profile: &RoleProfile,
    ) -> DomainResult<()> {
        let result = match profile {
            RoleProfile::Customer(p) => {
                sqlx::query(
                    r#"
                    UPDATE customer_profiles
                    SET id_photo_front = ?, id_photo_back = ?, profile_photo = ?, is_verified = ?
                    WHERE user_id = ?
                    "#,
                )
                .bind(storage_key(&p.id_photo_front))
                .bind(storage_key(&p.id_photo_back))
                .bind(storage_key(&p.profile_photo))
                .bind(p.is_verified)
                .bind(p.user_id.to_string())
                .execute(&mut **tx)
                .await
                .map_err(map_write_error)?
            }
            RoleProfile::Driver(p) => {
                sqlx::query(
                    r#"
                    UPDATE driver_profiles
                    SET driver_license = ?, profile_photo = ?, job_title = ?
                    WHERE user_id = ?
                    "#,
                )
                .bind(storage_key(&p.driver_license))
                .bind(storage_key(&p.profile_photo))
                .bind(&p.job_title)
                .bind(p.user_id.to_string())
                .execute(&mut **tx)
                .await
                .map_err(map_write_error)?
            }
        };

        if result.rows_affected() == 0 {
            return Err(DomainError::ProfileNotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ? LIMIT 1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence {
                message: e.to_string(),
            })?;
        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence {
                message: e.to_string(),
            })?;
        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE phone = ? LIMIT 1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence {
                message: e.to_string(),
            })?;
        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_profile(&self, user_id: Uuid) -> DomainResult<Option<RoleProfile>> {
        let id = user_id.to_string();

        let customer = sqlx::query("SELECT * FROM customer_profiles WHERE user_id = ? LIMIT 1")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence {
                message: e.to_string(),
            })?;
        if let Some(row) = customer {
            return Ok(Some(Self::row_to_customer_profile(&row)?));
        }

        let driver = sqlx::query("SELECT * FROM driver_profiles WHERE user_id = ? LIMIT 1")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence {
                message: e.to_string(),
            })?;
        driver
            .as_ref()
            .map(Self::row_to_driver_profile)
            .transpose()
    }

    async fn check_unique(&self, probe: UniquenessProbe<'_>) -> DomainResult<Vec<UniqueField>> {
        let excluding = probe.excluding.map(|id| id.to_string());
        let mut collisions = Vec::new();

        let checks = [
            (UniqueField::Username, "username", probe.username),
            (UniqueField::Email, "email", probe.email),
            (UniqueField::Phone, "phone", probe.phone),
        ];
        for (field, column, value) in checks {
            let Some(value) = value else { continue };
            let query = format!(
                "SELECT COUNT(*) FROM users WHERE {column} = ? AND (? IS NULL OR id <> ?)"
            );
            let count: i64 = sqlx::query_scalar(&query)
                .bind(value)
                .bind(&excluding)
                .bind(&excluding)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::Persistence {
                    message: e.to_string(),
                })?;
            if count > 0 {
                collisions.push(field);
            }
        }
        Ok(collisions)
    }
}
