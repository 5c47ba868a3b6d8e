use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::appointment_repository::AppointmentRepository,
    models::appointment::{Appointment, AppointmentPayload},
};

const APPOINTMENT_COLUMNS: &str =
    "id, date, duration, address, status, created_by, helper, created_at, updated_at";

pub struct PostgresAppointmentRepository {
    pub pool: PgPool,
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_appointment(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<Appointment, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (id, date, duration, address, status, created_by, helper)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(payload.date)
        .bind(payload.duration)
        .bind(&payload.address)
        .bind(&payload.status)
        .bind(payload.created_by)
        .bind(payload.helper)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        payload: &AppointmentPayload,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET date = $2,
                duration = $3,
                address = $4,
                status = $5,
                created_by = $6,
                helper = $7,
                updated_at = now()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.date)
        .bind(payload.duration)
        .bind(&payload.address)
        .bind(&payload.status)
        .bind(payload.created_by)
        .bind(payload.helper)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
