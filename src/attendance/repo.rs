use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{EmployeeWithStats, Shift, ShiftWithUser};
use super::store::ShiftStore;
use super::window::ClockInWindow;
use crate::auth::repo_types::{EmploymentType, ShiftType};
use crate::error::{is_unique_violation, AppResult};

const SHIFT_COLUMNS: &str =
    "id, user_id, company_id, clock_in, clock_out, status, notes, created_at, updated_at";

const SHIFT_WITH_USER_COLUMNS: &str = "s.id, s.user_id, s.company_id, s.clock_in, s.clock_out, \
     s.status, s.notes, s.created_at, s.updated_at, u.username, u.full_name, u.role";

// $2 = start, $3 = end, $4 = end inclusive
const WINDOW_FILTER: &str = "s.clock_in >= $2 AND (s.clock_in < $3 OR ($4 AND s.clock_in = $3))";

#[derive(Clone)]
pub struct PgShiftStore {
    db: PgPool,
}

impl PgShiftStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShiftStore for PgShiftStore {
    async fn open_shift(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        // The partial unique index on (user_id) WHERE status = 'in_progress'
        // makes this insert-or-nothing atomic.
        let res = sqlx::query_as::<_, Shift>(&format!(
            r#"
            INSERT INTO shifts (user_id, company_id, clock_in, status)
            VALUES ($1, $2, $3, 'in_progress')
            ON CONFLICT (user_id) WHERE status = 'in_progress' DO NOTHING
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(company_id)
        .bind(at)
        .fetch_optional(&self.db)
        .await;

        match res {
            Ok(shift) => Ok(shift),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn close_active_shift(
        &self,
        user_id: Uuid,
        notes: &str,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
               SET clock_out = $3, status = 'completed', notes = $2, updated_at = now()
             WHERE user_id = $1 AND status = 'in_progress'
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(notes)
        .bind(at)
        .fetch_optional(&self.db)
        .await
        .context("close active shift")?;
        Ok(shift)
    }

    async fn active_shift(&self, user_id: Uuid) -> AppResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
              FROM shifts
             WHERE user_id = $1 AND status = 'in_progress'
             LIMIT 1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get active shift")?;
        Ok(shift)
    }

    async fn user_shifts(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
              FROM shifts
             WHERE user_id = $1
             ORDER BY clock_in DESC
             LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list user shifts")?;
        Ok(rows)
    }

    async fn company_shifts(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ShiftWithUser>> {
        let rows = sqlx::query_as::<_, ShiftWithUser>(&format!(
            r#"
            SELECT {SHIFT_WITH_USER_COLUMNS}
              FROM shifts s
              JOIN users u ON u.id = s.user_id
             WHERE s.company_id = $1 AND {WINDOW_FILTER}
             ORDER BY s.clock_in DESC
             LIMIT $5 OFFSET $6
            "#
        ))
        .bind(company_id)
        .bind(window.start)
        .bind(window.end)
        .bind(window.end_inclusive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list company shifts")?;
        Ok(rows)
    }

    async fn company_shifts_chronological(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<ShiftWithUser>> {
        let rows = sqlx::query_as::<_, ShiftWithUser>(&format!(
            r#"
            SELECT {SHIFT_WITH_USER_COLUMNS}
              FROM shifts s
              JOIN users u ON u.id = s.user_id
             WHERE s.company_id = $1 AND {WINDOW_FILTER}
             ORDER BY s.clock_in ASC
            "#
        ))
        .bind(company_id)
        .bind(window.start)
        .bind(window.end)
        .bind(window.end_inclusive)
        .fetch_all(&self.db)
        .await
        .context("list company shifts by week")?;
        Ok(rows)
    }

    async fn shifts_in_window(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(&format!(
            r#"
            SELECT {SHIFT_COLUMNS}
              FROM shifts s
             WHERE s.company_id = $1 AND {WINDOW_FILTER}
            "#
        ))
        .bind(company_id)
        .bind(window.start)
        .bind(window.end)
        .bind(window.end_inclusive)
        .fetch_all(&self.db)
        .await
        .context("list shifts for report")?;
        Ok(rows)
    }

    async fn employees_with_hours(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<EmployeeWithStats>> {
        let rows = sqlx::query_as::<_, EmployeeWithStats>(&format!(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.role,
                   u.employment_type, u.shift_type, u.is_active,
                   COALESCE(SUM(EXTRACT(EPOCH FROM (s.clock_out - s.clock_in)) / 3600.0), 0)::float8
                       AS monthly_hours
              FROM users u
              LEFT JOIN shifts s
                ON s.user_id = u.id
               AND s.company_id = u.company_id
               AND s.status = 'completed'
               AND {WINDOW_FILTER}
             WHERE u.company_id = $1 AND u.is_active = true
             GROUP BY u.id
             ORDER BY u.full_name ASC
            "#
        ))
        .bind(company_id)
        .bind(window.start)
        .bind(window.end)
        .bind(window.end_inclusive)
        .fetch_all(&self.db)
        .await
        .context("list employees with hours")?;
        Ok(rows)
    }

    async fn update_schedule(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        employment_type: EmploymentType,
        shift_type: ShiftType,
    ) -> AppResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET employment_type = $3, shift_type = $4, updated_at = now()
             WHERE id = $2 AND company_id = $1
            "#,
        )
        .bind(company_id)
        .bind(employee_id)
        .bind(employment_type)
        .bind(shift_type)
        .execute(&self.db)
        .await
        .context("update employee schedule")?;
        Ok(res.rows_affected())
    }

    async fn insert_completed_shift(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        // Selecting the owner keeps shifts.company_id equal to the user's company.
        let shift = sqlx::query_as::<_, Shift>(&format!(
            r#"
            INSERT INTO shifts (user_id, company_id, clock_in, clock_out, status)
            SELECT u.id, u.company_id, $3, $4, 'completed'
              FROM users u
             WHERE u.id = $2 AND u.company_id = $1
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(company_id)
        .bind(user_id)
        .bind(clock_in)
        .bind(clock_out)
        .fetch_optional(&self.db)
        .await
        .context("insert assigned shift")?;
        Ok(shift)
    }

    async fn update_shift_times(
        &self,
        company_id: Uuid,
        shift_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE shifts
               SET clock_in = $3,
                   clock_out = $4,
                   status = CASE WHEN status = 'in_progress' THEN 'completed' ELSE status END,
                   updated_at = now()
             WHERE id = $2 AND company_id = $1
            "#,
        )
        .bind(company_id)
        .bind(shift_id)
        .bind(clock_in)
        .bind(clock_out)
        .execute(&self.db)
        .await
        .context("update shift times")?;
        Ok(res.rows_affected())
    }

    async fn delete_shift(&self, company_id: Uuid, shift_id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM shifts WHERE id = $2 AND company_id = $1")
            .bind(company_id)
            .bind(shift_id)
            .execute(&self.db)
            .await
            .context("delete shift")?;
        Ok(res.rows_affected())
    }
}
