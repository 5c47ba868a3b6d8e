use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::user_repository::UserRepository,
    models::user::{NewUser, User, UserRole, UserUpdate},
};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, profile_image, \
     role, status, password_changed_at, created_at, updated_at";

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_user(
        &self,
        payload: &NewUser,
        password_hash: &str,
    ) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, profile_image, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.email.trim())
        .bind(password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.profile_image)
        .bind(payload.role)
        .bind(payload.status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2,
                first_name = $3,
                last_name = $4,
                profile_image = $5,
                role = $6,
                status = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(update.email.trim())
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.profile_image)
        .bind(update.role)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_changed_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_user_role(&self, user_id: Uuid, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
