use crate::models::StatsResponse;
use crate::view::ViewState;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

pub const PROGRAM_DAYS: u32 = 90;

/// First day of the program. Independent of the `startDate` setting kept in the store.
pub const PROGRAM_START: NaiveDate = match NaiveDate::from_ymd_opt(2023, 8, 1) {
    Some(date) => date,
    None => panic!("invalid program start date"),
};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn build_stats(view: &ViewState) -> StatsResponse {
    build_stats_at(Local::now().naive_local(), view)
}

pub fn build_stats_at(now: NaiveDateTime, view: &ViewState) -> StatsResponse {
    let total_tasks = view.total_tasks();
    let completed_tasks = view.completed_tasks();
    let current_day = elapsed_days(now, PROGRAM_START);
    let progress_percentage = format!("{:.1}", progress_percentage(current_day));

    StatsResponse {
        total_tasks,
        completed_tasks,
        completion_rate: completion_rate(total_tasks, completed_tasks),
        current_day,
        days_left: PROGRAM_DAYS - current_day,
        progress_text: format!("Day {current_day} of {PROGRAM_DAYS} - {progress_percentage}% complete"),
        progress_percentage,
    }
}

/// Whole percent of completed tasks, 0 when there are no tasks.
pub fn completion_rate(total_tasks: usize, completed_tasks: usize) -> u32 {
    if total_tasks == 0 {
        return 0;
    }
    (completed_tasks as f64 / total_tasks as f64 * 100.0).round() as u32
}

/// Days between `now` and local midnight of `start`, rounded up and capped at the program length.
pub fn elapsed_days(now: NaiveDateTime, start: NaiveDate) -> u32 {
    let start = start.and_time(NaiveTime::MIN);
    let millis = (now - start).num_milliseconds().unsigned_abs();
    let days = millis.div_ceil(MILLIS_PER_DAY as u64);
    days.min(u64::from(PROGRAM_DAYS)) as u32
}

pub fn progress_percentage(elapsed_days: u32) -> f64 {
    f64::from(elapsed_days) / f64::from(PROGRAM_DAYS) * 100.0
}
