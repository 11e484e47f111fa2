use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo_types::{EmployeeWithStats, Shift, ShiftReport, ShiftWithUser};
use super::services::Page;
use super::window::parse_date;
use crate::error::{AppError, AppResult};

// Query values stay strings so malformed input surfaces as a JSON 400
// instead of the framework's plain-text rejection.

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl Pagination {
    pub fn page(&self) -> AppResult<Page> {
        Ok(Page {
            limit: parse_count("limit", self.limit.as_deref())?,
            offset: parse_count("offset", self.offset.as_deref())?,
        })
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {field}"))),
    }
}

fn parse_optional_date(field: &str, raw: Option<&str>) -> AppResult<Option<Date>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(field, s).map(Some),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub page: Pagination,
}

impl RangeQuery {
    pub fn dates(&self) -> AppResult<(Option<Date>, Option<Date>)> {
        Ok((
            parse_optional_date("start_date", self.start_date.as_deref())?,
            parse_optional_date("end_date", self.end_date.as_deref())?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week_start: Option<String>,
}

impl WeekQuery {
    pub fn week_start(&self) -> AppResult<Date> {
        parse_optional_date("week_start", self.week_start.as_deref())?
            .ok_or_else(|| AppError::validation("week_start parameter is required"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClockOutRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClockOutRequest {
    /// An empty body is the same as `{}`.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|_| AppError::validation("Invalid request body"))
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignShiftRequest {
    pub user_id: Uuid,
    pub clock_in: String,
    pub clock_out: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShiftRequest {
    pub clock_in: String,
    pub clock_out: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub employment_type: String,
    pub shift_type: String,
}

/// `{"message", "shift"}`; `shift` is `null` when there is none.
#[derive(Debug, Serialize)]
pub struct ShiftEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub shift: Option<Shift>,
}

#[derive(Debug, Serialize)]
pub struct ShiftList<T> {
    pub count: usize,
    pub shifts: Vec<T>,
}

impl<T> From<Vec<T>> for ShiftList<T> {
    fn from(shifts: Vec<T>) -> Self {
        Self {
            count: shifts.len(),
            shifts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RangedShiftList {
    pub shifts: Vec<ShiftWithUser>,
    pub count: usize,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: ShiftReport,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct EmployeeList {
    pub employees: Vec<EmployeeWithStats>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
