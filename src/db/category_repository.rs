use async_trait::async_trait;
use uuid::Uuid;

use crate::models::category::{Category, CategoryPayload};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error>;
    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, sqlx::Error>;
    async fn update_category(
        &self,
        id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Option<Category>, sqlx::Error>;
    async fn delete_category(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}
