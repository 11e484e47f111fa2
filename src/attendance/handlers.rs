use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AssignShiftRequest, ClockOutRequest, EmployeeList, MessageResponse, Pagination,
    RangeQuery, RangedShiftList, ReportResponse, ScheduleRequest, ShiftEnvelope, ShiftList,
    UpdateShiftRequest, WeekQuery,
};
use super::repo_types::{Shift, ShiftWithUser};
use super::window::{format_date, parse_timestamp};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn self_service_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/clock-in", post(clock_in))
        .route("/attendance/clock-out", post(clock_out))
        .route("/attendance/my-shifts", get(my_shifts))
        .route("/attendance/active-shift", get(active_shift))
        .route("/attendance/week-shifts", get(week_shifts))
}

pub fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/shifts", get(all_shifts).post(assign_shift))
        .route(
            "/attendance/shifts/:id",
            put(update_shift).delete(delete_shift),
        )
        .route("/attendance/report", get(report))
        .route("/attendance/employees", get(employees))
        .route(
            "/attendance/employees/:id/schedule",
            put(update_employee_schedule),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn clock_in(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ShiftEnvelope>)> {
    let shift = state.attendance.clock_in(&user.0).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShiftEnvelope {
            message: Some("Clocked in successfully"),
            shift: Some(shift),
        }),
    ))
}

/// The body is optional; an empty one means no notes, a malformed one is rejected.
#[instrument(skip(state, user, body), fields(user_id = %user.0.user_id))]
pub async fn clock_out(
    State(state): State<AppState>,
    user: AuthUser,
    body: Bytes,
) -> AppResult<Json<ShiftEnvelope>> {
    let notes = ClockOutRequest::from_body(&body)?.notes;
    let shift = state.attendance.clock_out(&user.0, notes).await?;
    Ok(Json(ShiftEnvelope {
        message: Some("Clocked out successfully"),
        shift: Some(shift),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn my_shifts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<Pagination>,
) -> AppResult<Json<ShiftList<Shift>>> {
    let shifts = state.attendance.my_shifts(&user.0, q.page()?).await?;
    Ok(Json(shifts.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn active_shift(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ShiftEnvelope>> {
    let shift = state.attendance.active_shift(&user.0).await?;
    let message = shift.is_none().then_some("No active shift");
    Ok(Json(ShiftEnvelope { message, shift }))
}

#[instrument(skip(state, user), fields(company_id = %user.0.company_id))]
pub async fn week_shifts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<WeekQuery>,
) -> AppResult<Json<ShiftList<ShiftWithUser>>> {
    let week_start = q.week_start()?;
    let shifts = state.attendance.week_shifts(&user.0, week_start).await?;
    Ok(Json(shifts.into()))
}

#[instrument(skip(state, user), fields(company_id = %user.0.company_id))]
pub async fn all_shifts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<RangedShiftList>> {
    let (start, end) = q.dates()?;
    let page = q.page.page()?;
    let (window, shifts) = state.attendance.all_shifts(&user.0, start, end, page).await?;
    Ok(Json(RangedShiftList {
        count: shifts.len(),
        shifts,
        start_date: format_date(window.start),
        end_date: format_date(window.end),
    }))
}

#[instrument(skip(state, user), fields(company_id = %user.0.company_id))]
pub async fn report(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<ReportResponse>> {
    let (start, end) = q.dates()?;
    let (window, report) = state.attendance.report(&user.0, start, end).await?;
    Ok(Json(ReportResponse {
        report,
        start_date: format_date(window.start),
        end_date: format_date(window.end),
    }))
}

#[instrument(skip(state, user), fields(company_id = %user.0.company_id))]
pub async fn employees(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<EmployeeList>> {
    let employees = state.attendance.employees(&user.0).await?;
    Ok(Json(EmployeeList {
        count: employees.len(),
        employees,
    }))
}

#[instrument(skip(state, user, payload), fields(company_id = %user.0.company_id))]
pub async fn update_employee_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<ScheduleRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .attendance
        .update_employee_schedule(
            &user.0,
            employee_id,
            &payload.employment_type,
            &payload.shift_type,
        )
        .await?;
    Ok(Json(MessageResponse {
        message: "Employee schedule updated successfully",
    }))
}

#[instrument(skip(state, user, payload), fields(company_id = %user.0.company_id, target = %payload.user_id))]
pub async fn assign_shift(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AssignShiftRequest>,
) -> AppResult<(StatusCode, Json<ShiftEnvelope>)> {
    let clock_in = parse_timestamp("clock_in", &payload.clock_in)?;
    let clock_out = parse_timestamp("clock_out", &payload.clock_out)?;
    let shift = state
        .attendance
        .assign_shift(&user.0, payload.user_id, clock_in, clock_out)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ShiftEnvelope {
            message: Some("Shift assigned successfully"),
            shift: Some(shift),
        }),
    ))
}

#[instrument(skip(state, user, payload), fields(company_id = %user.0.company_id))]
pub async fn update_shift(
    State(state): State<AppState>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    Json(payload): Json<UpdateShiftRequest>,
) -> AppResult<Json<MessageResponse>> {
    let clock_in = parse_timestamp("clock_in", &payload.clock_in)?;
    let clock_out = parse_timestamp("clock_out", &payload.clock_out)?;
    state
        .attendance
        .update_shift(&user.0, shift_id, clock_in, clock_out)
        .await?;
    Ok(Json(MessageResponse {
        message: "Shift updated successfully",
    }))
}

#[instrument(skip(state, user), fields(company_id = %user.0.company_id))]
pub async fn delete_shift(
    State(state): State<AppState>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.attendance.delete_shift(&user.0, shift_id).await?;
    Ok(Json(MessageResponse {
        message: "Shift deleted successfully",
    }))
}
