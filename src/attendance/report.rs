use super::repo_types::{Shift, ShiftReport, ShiftStatus};

/// Rolls the shifts of a date range into counts and hours in a single pass.
///
/// Only shifts that have a clock-out contribute hours. The average is taken over
/// completed shifts and is zero when there are none.
pub fn aggregate<'a>(shifts: impl IntoIterator<Item = &'a Shift>) -> ShiftReport {
    let mut report = shifts
        .into_iter()
        .fold(ShiftReport::default(), |mut acc, shift| {
            acc.total_shifts += 1;
            match shift.status {
                ShiftStatus::Completed => acc.completed_shifts += 1,
                ShiftStatus::InProgress => acc.active_shifts += 1,
                ShiftStatus::Cancelled => {}
            }
            acc.total_hours += shift.worked_hours();
            acc
        });

    if report.completed_shifts > 0 {
        report.average_hours = report.total_hours / report.completed_shifts as f64;
    }
    report
}
