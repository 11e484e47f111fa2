//! Who may run which attendance operation.
//!
//! Every operation is listed once with the roles allowed to call it. A
//! successful check yields a [`Scope`], and the scope's company id is the only
//! tenant id the attendance store ever receives.

use tracing::warn;
use uuid::Uuid;

use super::repo_types::Role;
use crate::error::AppError;

/// Verified caller, as decoded from an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ClockIn,
    ClockOut,
    MyShifts,
    ActiveShift,
    WeekShifts,
    AllShifts,
    Report,
    Employees,
    UpdateEmployeeSchedule,
    AssignShift,
    UpdateShift,
    DeleteShift,
}

const ANY_ROLE: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
const SUPERVISORS: &[Role] = &[Role::Manager, Role::Admin];

impl Operation {
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::ClockIn
            | Operation::ClockOut
            | Operation::MyShifts
            | Operation::ActiveShift
            | Operation::WeekShifts => ANY_ROLE,
            Operation::AllShifts
            | Operation::Report
            | Operation::Employees
            | Operation::UpdateEmployeeSchedule
            | Operation::AssignShift
            | Operation::UpdateShift
            | Operation::DeleteShift => SUPERVISORS,
        }
    }
}

/// Tenant-bound context handed to the store after a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    user_id: Uuid,
    company_id: Uuid,
}

impl Scope {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn company_id(&self) -> Uuid {
        self.company_id
    }
}

pub fn authorize(identity: &Identity, op: Operation) -> Result<Scope, AppError> {
    if !op.allowed_roles().contains(&identity.role) {
        warn!(
            user_id = %identity.user_id,
            role = %identity.role,
            operation = ?op,
            "operation denied"
        );
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }
    Ok(Scope {
        user_id: identity.user_id,
        company_id: identity.company_id,
    })
}
