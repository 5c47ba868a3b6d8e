use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::category_repository::CategoryRepository,
    models::category::{Category, CategoryPayload},
};

pub struct PostgresCategoryRepository {
    pub pool: PgPool,
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING id, name, description",
        )
        .bind(Uuid::new_v4())
        .bind(payload.name.trim())
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_category(
        &self,
        id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, description = $3 WHERE id = $1 RETURNING id, name, description",
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(&payload.description)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
