use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{EmploymentType, Role, ShiftType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum ShiftStatus {
    InProgress,
    Completed,
    // Allowed by the schema, never written by any operation.
    Cancelled,
}

/// Shift record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Shift {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub clock_in: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub clock_out: Option<OffsetDateTime>,
    pub status: ShiftStatus,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Shift {
    /// Hours between clock-in and clock-out; zero while the shift is open.
    pub fn worked_hours(&self) -> f64 {
        match self.clock_out {
            Some(out) => (out - self.clock_in).as_seconds_f64() / 3600.0,
            None => 0.0,
        }
    }
}

/// Shift joined with the owner's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ShiftWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub shift: Shift,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

/// Roster row: an active user plus completed hours in the current month.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EmployeeWithStats {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub employment_type: Option<EmploymentType>,
    pub shift_type: Option<ShiftType>,
    pub is_active: bool,
    pub monthly_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShiftReport {
    pub total_shifts: i64,
    pub completed_shifts: i64,
    pub active_shifts: i64,
    pub total_hours: f64,
    pub average_hours: f64,
}
