//! Habit recurrence, streak and mood statistics engine.
//!
//! Everything here is a pure function of its arguments. Callers load the
//! snapshots (habits, completions, moods) and pass the reference day in
//! explicitly; nothing in this module reads the clock or touches storage.

pub mod agenda;
pub mod mood_stats;
pub mod schedule;
pub mod streak;

pub use agenda::{group_by_habit, habits_for_date};
pub use mood_stats::mood_statistics;
pub use schedule::{is_due, Schedule};
pub use streak::{completion_dates, completion_rate, compute_streak, streak_from_dates};
