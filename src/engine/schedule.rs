use chrono::{Datelike, Days, NaiveDate};

use crate::models::habit::{Habit, HabitFrequency};

/// Resolved recurrence rule of a habit.
///
/// Built once per query from the stored frequency fields. Configurations that
/// cannot produce a due date (weekly without valid weekdays, custom without a
/// positive interval) resolve to [`Schedule::Never`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    /// Bit `n` set means weekday `n` (0 = Monday) is due.
    Weekly { weekdays: u8 },
    /// Due on `anchor + k * interval_days` for `k >= 0`.
    Custom { interval_days: u32, anchor: NaiveDate },
    Never,
}

impl Schedule {
    pub fn for_habit(habit: &Habit) -> Self {
        match habit.frequency {
            HabitFrequency::Daily => Self::Daily,
            HabitFrequency::Weekly => {
                let days = habit.weekdays.as_deref().unwrap_or_default();
                match Self::weekly(days) {
                    Some(schedule) => schedule,
                    None => {
                        tracing::warn!(habit_id = %habit.id, weekdays = ?habit.weekdays, "Weekly habit has no usable weekdays, treating as never due");
                        Self::Never
                    }
                }
            }
            HabitFrequency::Custom => {
                let anchor = habit.created_at.date_naive();
                match habit.custom_interval_days.and_then(|n| Self::custom(n, anchor)) {
                    Some(schedule) => schedule,
                    None => {
                        tracing::warn!(habit_id = %habit.id, interval = ?habit.custom_interval_days, "Custom habit has no positive interval, treating as never due");
                        Self::Never
                    }
                }
            }
        }
    }

    /// `None` if no weekday is in 0..=6. Out-of-range entries are ignored.
    pub fn weekly(days: &[i16]) -> Option<Self> {
        let weekdays = days
            .iter()
            .filter(|d| (0..=6).contains(*d))
            .fold(0u8, |mask, d| mask | (1u8 << *d));
        (weekdays != 0).then_some(Self::Weekly { weekdays })
    }

    pub fn custom(interval_days: i32, anchor: NaiveDate) -> Option<Self> {
        let interval_days = u32::try_from(interval_days).ok().filter(|n| *n > 0)?;
        Some(Self::Custom {
            interval_days,
            anchor,
        })
    }

    pub fn is_due(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Daily => true,
            Self::Weekly { weekdays } => weekdays & (1u8 << date.weekday().num_days_from_monday()) != 0,
            Self::Custom {
                interval_days,
                anchor,
            } => date >= anchor && (date - anchor).num_days() % i64::from(interval_days) == 0,
            Self::Never => false,
        }
    }

    /// Latest due date that is `<= date`.
    pub fn due_on_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Self::Daily => Some(date),
            Self::Weekly { .. } => (0..7)
                .filter_map(|back| date.checked_sub_days(Days::new(back)))
                .find(|d| self.is_due(*d)),
            Self::Custom {
                interval_days,
                anchor,
            } => {
                if date < anchor {
                    return None;
                }
                let offset = (date - anchor).num_days() % i64::from(interval_days);
                date.checked_sub_days(Days::new(offset as u64))
            }
            Self::Never => None,
        }
    }

    /// Earliest due date that is `> date`.
    pub fn next_due_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Self::Daily => date.succ_opt(),
            Self::Weekly { .. } => (1..=7)
                .filter_map(|ahead| date.checked_add_days(Days::new(ahead)))
                .find(|d| self.is_due(*d)),
            Self::Custom {
                interval_days,
                anchor,
            } => {
                if date < anchor {
                    return Some(anchor);
                }
                let interval = i64::from(interval_days);
                let offset = (date - anchor).num_days() % interval;
                date.checked_add_days(Days::new((interval - offset) as u64))
            }
            Self::Never => None,
        }
    }

    /// Due dates within `start..=end`, ascending.
    pub fn due_dates_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut cursor = start.pred_opt().and_then(|d| self.next_due_after(d));
        while let Some(day) = cursor {
            if day > end {
                break;
            }
            dates.push(day);
            cursor = self.next_due_after(day);
        }
        dates
    }
}

/// Whether `habit` is due on `date`.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    Schedule::for_habit(habit).is_due(date)
}
