use async_trait::async_trait;
use uuid::Uuid;

use crate::models::appointment::{Appointment, AppointmentPayload};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error>;
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, sqlx::Error>;
    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<Appointment, sqlx::Error>;
    async fn update_appointment(
        &self,
        id: Uuid,
        payload: &AppointmentPayload,
    ) -> Result<Option<Appointment>, sqlx::Error>;
    async fn delete_appointment(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}
