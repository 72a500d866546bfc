use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::engine::is_due;
use crate::models::completion::Completion;
use crate::models::habit::{Habit, HabitForDate};

/// Groups completions by the habit they belong to.
pub fn group_by_habit(completions: Vec<Completion>) -> HashMap<Uuid, Vec<Completion>> {
    let mut grouped: HashMap<Uuid, Vec<Completion>> = HashMap::new();
    for completion in completions {
        grouped.entry(completion.habit_id).or_default().push(completion);
    }
    grouped
}

/// Habits due on `date` with their completion status for that day.
///
/// `habits` is expected to hold only active habits. When a habit was
/// completed several times on `date` the earliest completion is reported.
pub fn habits_for_date(
    habits: &[Habit],
    completions_by_habit: &HashMap<Uuid, Vec<Completion>>,
    date: NaiveDate,
) -> Vec<HabitForDate> {
    habits
        .iter()
        .filter(|habit| is_due(habit, date))
        .map(|habit| {
            let completion = completions_by_habit
                .get(&habit.id)
                .into_iter()
                .flatten()
                .filter(|c| c.completed_date() == date)
                .min_by_key(|c| c.completed_at)
                .cloned();
            HabitForDate {
                habit: habit.clone(),
                is_completed: completion.is_some(),
                completion,
            }
        })
        .collect()
}
