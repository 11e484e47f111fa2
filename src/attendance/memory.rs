use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{EmployeeWithStats, Shift, ShiftStatus, ShiftWithUser};
use super::store::ShiftStore;
use super::window::ClockInWindow;
use crate::auth::repo_types::{EmploymentType, Role, ShiftType, User};
use crate::error::AppResult;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    shifts: Vec<Shift>,
}

/// `ShiftStore` over in-process tables. A single lock serializes every call,
/// which gives the same one-winner outcome as the conditional SQL writes.
#[derive(Default)]
pub struct MemoryShiftStore {
    tables: Mutex<Tables>,
}

impl MemoryShiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, company_id: Uuid, username: &str, full_name: &str, role: Role) -> User {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            company_id,
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            full_name: full_name.into(),
            role,
            employment_type: None,
            shift_type: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn deactivate(&self, user_id: Uuid) {
        let mut t = self.tables.lock().unwrap();
        if let Some(u) = t.users.iter_mut().find(|u| u.id == user_id) {
            u.is_active = false;
        }
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        let t = self.tables.lock().unwrap();
        t.users.iter().find(|u| u.id == user_id).cloned()
    }

    pub fn all_shifts(&self) -> Vec<Shift> {
        self.tables.lock().unwrap().shifts.clone()
    }

    /// Inserts a shift as-is, bypassing every rule.
    pub fn seed_shift(
        &self,
        user: &User,
        clock_in: OffsetDateTime,
        clock_out: Option<OffsetDateTime>,
    ) -> Shift {
        let shift = Shift {
            id: Uuid::new_v4(),
            user_id: user.id,
            company_id: user.company_id,
            clock_in,
            clock_out,
            status: if clock_out.is_some() {
                ShiftStatus::Completed
            } else {
                ShiftStatus::InProgress
            },
            notes: None,
            created_at: clock_in,
            updated_at: clock_in,
        };
        self.tables.lock().unwrap().shifts.push(shift.clone());
        shift
    }
}

impl Tables {
    fn with_user(&self, shift: &Shift) -> Option<ShiftWithUser> {
        let user = self.users.iter().find(|u| u.id == shift.user_id)?;
        Some(ShiftWithUser {
            shift: shift.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        })
    }

    fn company_window(&self, company_id: Uuid, window: ClockInWindow) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.company_id == company_id && window.contains(s.clock_in))
            .collect()
    }
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl ShiftStore for MemoryShiftStore {
    async fn open_shift(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        let mut t = self.tables.lock().unwrap();
        if t
            .shifts
            .iter()
            .any(|s| s.user_id == user_id && s.status == ShiftStatus::InProgress)
        {
            return Ok(None);
        }
        let shift = Shift {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            clock_in: at,
            clock_out: None,
            status: ShiftStatus::InProgress,
            notes: None,
            created_at: at,
            updated_at: at,
        };
        t.shifts.push(shift.clone());
        Ok(Some(shift))
    }

    async fn close_active_shift(
        &self,
        user_id: Uuid,
        notes: &str,
        at: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        let mut t = self.tables.lock().unwrap();
        let Some(shift) = t
            .shifts
            .iter_mut()
            .find(|s| s.user_id == user_id && s.status == ShiftStatus::InProgress)
        else {
            return Ok(None);
        };
        shift.clock_out = Some(at);
        shift.status = ShiftStatus::Completed;
        shift.notes = Some(notes.to_string());
        shift.updated_at = at;
        Ok(Some(shift.clone()))
    }

    async fn active_shift(&self, user_id: Uuid) -> AppResult<Option<Shift>> {
        let t = self.tables.lock().unwrap();
        Ok(t
            .shifts
            .iter()
            .find(|s| s.user_id == user_id && s.status == ShiftStatus::InProgress)
            .cloned())
    }

    async fn user_shifts(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<Shift>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Shift> = t
            .shifts
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.clock_in.cmp(&a.clock_in));
        Ok(page(rows, limit, offset))
    }

    async fn company_shifts(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ShiftWithUser>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<ShiftWithUser> = t
            .company_window(company_id, window)
            .into_iter()
            .filter_map(|s| t.with_user(s))
            .collect();
        rows.sort_by(|a, b| b.shift.clock_in.cmp(&a.shift.clock_in));
        Ok(page(rows, limit, offset))
    }

    async fn company_shifts_chronological(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<ShiftWithUser>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<ShiftWithUser> = t
            .company_window(company_id, window)
            .into_iter()
            .filter_map(|s| t.with_user(s))
            .collect();
        rows.sort_by(|a, b| a.shift.clock_in.cmp(&b.shift.clock_in));
        Ok(rows)
    }

    async fn shifts_in_window(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<Shift>> {
        let t = self.tables.lock().unwrap();
        Ok(t.company_window(company_id, window)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn employees_with_hours(
        &self,
        company_id: Uuid,
        window: ClockInWindow,
    ) -> AppResult<Vec<EmployeeWithStats>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<EmployeeWithStats> = t
            .users
            .iter()
            .filter(|u| u.company_id == company_id && u.is_active)
            .map(|u| EmployeeWithStats {
                id: u.id,
                username: u.username.clone(),
                email: u.email.clone(),
                full_name: u.full_name.clone(),
                role: u.role,
                employment_type: u.employment_type,
                shift_type: u.shift_type,
                is_active: u.is_active,
                monthly_hours: t
                    .shifts
                    .iter()
                    .filter(|s| {
                        s.user_id == u.id
                            && s.status == ShiftStatus::Completed
                            && window.contains(s.clock_in)
                    })
                    .map(Shift::worked_hours)
                    .sum(),
            })
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(rows)
    }

    async fn update_schedule(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        employment_type: EmploymentType,
        shift_type: ShiftType,
    ) -> AppResult<u64> {
        let mut t = self.tables.lock().unwrap();
        match t
            .users
            .iter_mut()
            .find(|u| u.id == employee_id && u.company_id == company_id)
        {
            Some(u) => {
                u.employment_type = Some(employment_type);
                u.shift_type = Some(shift_type);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_completed_shift(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<Option<Shift>> {
        let mut t = self.tables.lock().unwrap();
        if !t
            .users
            .iter()
            .any(|u| u.id == user_id && u.company_id == company_id)
        {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let shift = Shift {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            clock_in,
            clock_out: Some(clock_out),
            status: ShiftStatus::Completed,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        t.shifts.push(shift.clone());
        Ok(Some(shift))
    }

    async fn update_shift_times(
        &self,
        company_id: Uuid,
        shift_id: Uuid,
        clock_in: OffsetDateTime,
        clock_out: OffsetDateTime,
    ) -> AppResult<u64> {
        let mut t = self.tables.lock().unwrap();
        match t
            .shifts
            .iter_mut()
            .find(|s| s.id == shift_id && s.company_id == company_id)
        {
            Some(s) => {
                s.clock_in = clock_in;
                s.clock_out = Some(clock_out);
                if s.status == ShiftStatus::InProgress {
                    s.status = ShiftStatus::Completed;
                }
                s.updated_at = OffsetDateTime::now_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_shift(&self, company_id: Uuid, shift_id: Uuid) -> AppResult<u64> {
        let mut t = self.tables.lock().unwrap();
        let before = t.shifts.len();
        t.shifts
            .retain(|s| !(s.id == shift_id && s.company_id == company_id));
        Ok((before - t.shifts.len()) as u64)
    }
}
