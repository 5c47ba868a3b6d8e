use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{NewUser, User, UserRole, UserUpdate};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(&self, payload: &NewUser, password_hash: &str)
        -> Result<Uuid, sqlx::Error>;
    async fn update_user(
        &self,
        user_id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error>;
    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error>;
    async fn set_user_role(&self, user_id: Uuid, role: UserRole) -> Result<bool, sqlx::Error>;
}
