use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::engine::schedule::Schedule;
use crate::models::completion::{Completion, StreakResult};
use crate::models::habit::Habit;

/// Distinct calendar dates with at least one completion.
pub fn completion_dates(completions: &[Completion]) -> BTreeSet<NaiveDate> {
    completions.iter().map(Completion::completed_date).collect()
}

/// Consecutive completed due dates, walking back from the latest due date on
/// or before `today`. A missed due date ends the walk, so an uncompleted
/// `today` yields 0 for daily habits.
pub fn current_streak(schedule: &Schedule, dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&earliest) = dates.first() else {
        return 0;
    };

    let mut streak = 0;
    let mut cursor = schedule.due_on_or_before(today);
    while let Some(day) = cursor {
        if day < earliest || !dates.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt().and_then(|d| schedule.due_on_or_before(d));
    }
    streak
}

/// Longest run of completed due dates where each follows the previous due
/// date directly. Completions on dates that are not due are ignored.
pub fn longest_streak(schedule: &Schedule, dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates.iter().filter(|d| schedule.is_due(**d)) {
        run = match prev {
            Some(p) if schedule.next_due_after(p) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

/// Streak statistics for one habit, recomputed from its full history.
pub fn compute_streak(habit: &Habit, completions: &[Completion], today: NaiveDate) -> StreakResult {
    let schedule = Schedule::for_habit(habit);
    let dates = completion_dates(completions);
    streak_from_dates(&schedule, &dates, completions.len() as u64, today)
}

/// Same as [`compute_streak`] for callers that already resolved the
/// schedule and completion dates.
pub fn streak_from_dates(
    schedule: &Schedule,
    dates: &BTreeSet<NaiveDate>,
    total_completions: u64,
    today: NaiveDate,
) -> StreakResult {
    StreakResult {
        current_streak: current_streak(schedule, dates, today),
        longest_streak: longest_streak(schedule, dates),
        total_completions,
    }
}

/// Share of due dates in the `window_days` ending at `today` that have a
/// completion. 0.0 when nothing was due in the window.
pub fn completion_rate(
    schedule: &Schedule,
    dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    window_days: u64,
) -> f64 {
    let Some(start) = today.checked_sub_days(Days::new(window_days.saturating_sub(1))) else {
        return 0.0;
    };
    let due = schedule.due_dates_between(start, today);
    if due.is_empty() {
        return 0.0;
    }
    let completed = due.iter().filter(|d| dates.contains(d)).count();
    completed as f64 / due.len() as f64
}
