use std::sync::Arc;

use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::report::aggregate;
use super::repo_types::{EmployeeWithStats, Shift, ShiftReport, ShiftWithUser};
use super::store::ShiftStore;
use super::window::{month_window, reporting_window, week_window, ClockInWindow};
use crate::auth::policy::{authorize, Identity, Operation};
use crate::auth::repo_types::{EmploymentType, ShiftType};
use crate::error::{AppError, AppResult};

const MY_SHIFTS_DEFAULT_LIMIT: i64 = 50;
const COMPANY_SHIFTS_DEFAULT_LIMIT: i64 = 100;

/// Limit/offset as received; `None` or a zero limit means "use the default".
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    // No upper cap on limit: callers get what they ask for.
    fn resolve(self, default_limit: i64) -> AppResult<(i64, i64)> {
        let limit = match self.limit {
            None | Some(0) => default_limit,
            Some(n) if n < 0 => return Err(AppError::validation("limit must not be negative")),
            Some(n) => n,
        };
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::validation("offset must not be negative"));
        }
        Ok((limit, offset))
    }
}

/// Attendance rules on top of a [`ShiftStore`].
///
/// Every method authorizes the caller first; store calls only ever receive the
/// company id from the resulting scope.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn ShiftStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn ShiftStore>) -> Self {
        Self { store }
    }

    pub async fn clock_in(&self, identity: &Identity) -> AppResult<Shift> {
        let scope = authorize(identity, Operation::ClockIn)?;
        let now = OffsetDateTime::now_utc();
        match self
            .store
            .open_shift(scope.user_id(), scope.company_id(), now)
            .await?
        {
            Some(shift) => {
                info!(user_id = %shift.user_id, shift_id = %shift.id, "clocked in");
                Ok(shift)
            }
            None => {
                warn!(user_id = %scope.user_id(), "clock-in with an active shift");
                Err(AppError::conflict("active shift exists"))
            }
        }
    }

    pub async fn clock_out(&self, identity: &Identity, notes: Option<String>) -> AppResult<Shift> {
        let scope = authorize(identity, Operation::ClockOut)?;
        let notes = notes.unwrap_or_default();
        let now = OffsetDateTime::now_utc();
        let shift = self
            .store
            .close_active_shift(scope.user_id(), &notes, now)
            .await?
            .ok_or_else(|| AppError::not_found("no active shift"))?;
        info!(
            user_id = %shift.user_id,
            shift_id = %shift.id,
            hours = shift.worked_hours(),
            "clocked out"
        );
        Ok(shift)
    }

    pub async fn my_shifts(&self, identity: &Identity, page: Page) -> AppResult<Vec<Shift>> {
        let scope = authorize(identity, Operation::MyShifts)?;
        let (limit, offset) = page.resolve(MY_SHIFTS_DEFAULT_LIMIT)?;
        self.store.user_shifts(scope.user_id(), limit, offset).await
    }

    /// `None` is the ordinary "not clocked in" state.
    pub async fn active_shift(&self, identity: &Identity) -> AppResult<Option<Shift>> {
        let scope = authorize(identity, Operation::ActiveShift)?;
        self.store.active_shift(scope.user_id()).await
    }

    /// Company shifts inside the resolved window, newest first.
    pub async fn all_shifts(
        &self,
        identity: &Identity,
        start: Option<Date>,
        end: Option<Date>,
        page: Page,
    ) -> AppResult<(ClockInWindow, Vec<ShiftWithUser>)> {
        let scope = authorize(identity, Operation::AllShifts)?;
        let (limit, offset) = page.resolve(COMPANY_SHIFTS_DEFAULT_LIMIT)?;
        let window = reporting_window(start, end, OffsetDateTime::now_utc())?;
        let shifts = self
            .store
            .company_shifts(scope.company_id(), window, limit, offset)
            .await?;
        Ok((window, shifts))
    }

    pub async fn week_shifts(
        &self,
        identity: &Identity,
        week_start: Date,
    ) -> AppResult<Vec<ShiftWithUser>> {
        let scope = authorize(identity, Operation::WeekShifts)?;
        self.store
            .company_shifts_chronological(scope.company_id(), week_window(week_start)?)
            .await
    }

    pub async fn employees(&self, identity: &Identity) -> AppResult<Vec<EmployeeWithStats>> {
        let scope = authorize(identity, Operation::Employees)?;
        let window = month_window(OffsetDateTime::now_utc())?;
        self.store
            .employees_with_hours(scope.company_id(), window)
            .await
    }

    /// Both values are checked before anything is written.
    pub async fn update_employee_schedule(
        &self,
        identity: &Identity,
        employee_id: Uuid,
        employment_type: &str,
        shift_type: &str,
    ) -> AppResult<()> {
        let scope = authorize(identity, Operation::UpdateEmployeeSchedule)?;
        let employment_type: EmploymentType =
            employment_type.parse().map_err(AppError::Validation)?;
        let shift_type: ShiftType = shift_type.parse().map_err(AppError::Validation)?;

        let updated = self
            .store
            .update_schedule(scope.company_id(), employee_id, employment_type, shift_type)
            .await?;
        if updated == 0 {
            return Err(AppError::not_found("employee not found"));
        }
        info!(
            company_id = %scope.company_id(),
            employee_id = %employee_id,
            by = %scope.user_id(),
            "employee schedule updated"
        );
        Ok(())
    }

    /// Creates an already completed shift. No active-shift check applies since
    /// the new record is never in progress.
    pub async fn assign_shift(
        &self,
        identity: &Identity,
        user_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<Shift> {
        let scope = authorize(identity, Operation::AssignShift)?;
        ensure_ordered(clock_in, clock_out)?;
        let shift = self
            .store
            .insert_completed_shift(scope.company_id(), user_id, clock_in, clock_out)
            .await?
            .ok_or_else(|| AppError::not_found("employee not found"))?;
        info!(
            company_id = %scope.company_id(),
            user_id = %user_id,
            shift_id = %shift.id,
            by = %scope.user_id(),
            "shift assigned"
        );
        Ok(shift)
    }

    /// Unknown or foreign shift ids are a silent no-op, not an error.
    pub async fn update_shift(
        &self,
        identity: &Identity,
        shift_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<()> {
        let scope = authorize(identity, Operation::UpdateShift)?;
        ensure_ordered(clock_in, clock_out)?;
        let updated = self
            .store
            .update_shift_times(scope.company_id(), shift_id, clock_in, clock_out)
            .await?;
        info!(shift_id = %shift_id, updated, by = %scope.user_id(), "shift updated");
        Ok(())
    }

    /// Unknown or foreign shift ids are a silent no-op, not an error.
    pub async fn delete_shift(&self, identity: &Identity, shift_id: Uuid) -> AppResult<()> {
        let scope = authorize(identity, Operation::DeleteShift)?;
        let deleted = self
            .store
            .delete_shift(scope.company_id(), shift_id)
            .await?;
        info!(shift_id = %shift_id, deleted, by = %scope.user_id(), "shift deleted");
        Ok(())
    }

    pub async fn report(
        &self,
        identity: &Identity,
        start: Option<Date>,
        end: Option<Date>,
    ) -> AppResult<(ClockInWindow, ShiftReport)> {
        let scope = authorize(identity, Operation::Report)?;
        let window = reporting_window(start, end, OffsetDateTime::now_utc())?;
        let shifts = self
            .store
            .shifts_in_window(scope.company_id(), window)
            .await?;
        Ok((window, aggregate(&shifts)))
    }
}

fn ensure_ordered(clock_in: OffsetDateTime, clock_out: OffsetDateTime) -> AppResult<()> {
    if clock_out < clock_in {
        return Err(AppError::validation("clock_out must not be before clock_in"));
    }
    Ok(())
}
