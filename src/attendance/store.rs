use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{EmployeeWithStats, Shift, ShiftWithUser};
use super::window::ClockInWindow;
use crate::auth::repo_types::{EmploymentType, ShiftType};
use crate::error::AppResult;

/// Durable shift persistence.
///
/// `open_shift` and `close_active_shift` must each be a single atomic
/// conditional write: concurrent callers for one user see exactly one winner.
/// Every read or write that takes a `company_id` filters by it.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Inserts an in-progress shift unless the user already has one.
    /// Returns `None` when an active shift exists.
    async fn open_shift(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>>;

    /// Completes the user's in-progress shift. `None` when there is none.
    async fn close_active_shift(
        &self,
        user_id: Uuid,
        notes: &str,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>>;

    async fn active_shift(&self, user_id: Uuid) -> AppResult<Option<Shift>>;

    /// Newest first.
    async fn user_shifts(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<Shift>>;

    /// Newest first.
    async fn company_shifts(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ShiftWithUser>>;

    /// Oldest first, unpaginated.
    async fn company_shifts_chronological(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<ShiftWithUser>>;

    /// Every shift of the company in the window, for aggregation.
    async fn shifts_in_window(&self, company_id: Uuid, window: ClockInWindow)
        -> AppResult<Vec<Shift>>;

    /// Active users ordered by full name, with completed hours inside `window`.
    async fn employees_with_hours(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<EmployeeWithStats>>;

    /// Returns the number of users updated (0 or 1).
    async fn update_schedule(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        employment_type: EmploymentType,
        shift_type: ShiftType,
    ) -> AppResult<u64>;

    /// Inserts a completed shift for a user of `company_id`.
    /// `None` when the user is not part of that company.
    async fn insert_completed_shift(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<Option<Shift>>;

    /// Returns the number of shifts updated (0 or 1).
    async fn update_shift_times(
        &self,
        company_id: Uuid,
        shift_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<u64>;

    /// Returns the number of shifts deleted (0 or 1).
    async fn delete_shift(&self, company_id: Uuid, shift_id: Uuid) -> AppResult<u64>;
}
