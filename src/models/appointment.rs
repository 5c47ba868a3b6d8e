use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    /// Length of the appointment in seconds.
    pub duration: i64,
    pub address: String,
    pub status: String,
    pub created_by: Uuid,
    pub helper: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentPayload {
    pub date: DateTime<Utc>,
    pub duration: i64,
    pub address: String,
    pub status: String,
    pub created_by: Uuid,
    pub helper: Uuid,
}
