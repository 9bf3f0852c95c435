//! User entity representing a registered identity in the Sheger Dispatch system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user
///
/// Dispatch on this enum is always exhaustive; an unrecognized role string
/// fails at the parsing boundary rather than falling through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// A driver delivering orders
    Driver,
    /// A customer placing orders
    Customer,
}

impl Role {
    /// Parse a role from its wire representation
    pub fn parse(value: &str) -> Option<Role> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "driver" => Some(Role::Driver),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
            Role::Customer => "customer",
        }
    }

    /// Whether users with this role carry a driver-style profile
    ///
    /// Admins share the driver profile shape (license, job title), matching
    /// the staff registration path.
    pub fn uses_driver_profile(&self) -> bool {
        matches!(self, Role::Admin | Role::Driver)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity representing a registered identity
///
/// `username`, `email` and `phone` are globally unique; the storage layer is
/// the authoritative arbiter of that at commit time. The password is only
/// ever held here as a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Full display name
    pub full_name: String,

    /// Unique username
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Unique phone number
    pub phone: String,

    /// Hashed password; never the plaintext
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Role assigned to this user
    pub role: Role,

    /// Optional street address
    pub address: Option<String>,

    /// Whether the account is active (deactivation is an external concern)
    pub is_active: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active User
    pub fn new(
        full_name: String,
        username: String,
        email: String,
        phone: String,
        password_hash: String,
        role: Role,
        address: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name,
            username,
            email,
            phone,
            password_hash,
            role,
            address,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the entity as touched
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Checks if the user is a customer
    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }

    /// Checks if the user is staff (admin or driver)
    pub fn is_staff(&self) -> bool {
        self.role.uses_driver_profile()
    }
}
