use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role")] // Matches the Postgres enum name
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Superadmin,
}

impl UserRole {
    /// Roles allowed through the admin gate.
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Superadmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, FromRow, Serialize, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub status: UserStatus,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Body of `POST /admin/users`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(rename = "type", default = "default_role")]
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Body of `PUT /admin/users/{id}`. Role changes to or from `superadmin`
/// go through the dedicated promotion routes instead.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub status: UserStatus,
}
