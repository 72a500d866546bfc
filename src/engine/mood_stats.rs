use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::mood::{Mood, MoodLevel, MoodStats};

/// Aggregates the mood records of one window.
///
/// Ties for best and worst day go to the earliest date. Records with a level
/// outside 1..=5 are skipped.
pub fn mood_statistics(moods: &[Mood]) -> MoodStats {
    let mut entries: Vec<(NaiveDate, MoodLevel)> = moods
        .iter()
        .filter_map(|m| match MoodLevel::from_level(m.mood_level) {
            Some(level) => Some((m.mood_date, level)),
            None => {
                tracing::warn!(mood_id = %m.id, level = m.mood_level, "Skipping mood with invalid level");
                None
            }
        })
        .collect();
    entries.sort_by_key(|(date, _)| *date);

    if entries.is_empty() {
        return MoodStats {
            average_mood: 0.0,
            total_records: 0,
            mood_distribution: BTreeMap::new(),
            best_day: None,
            worst_day: None,
        };
    }

    let sum: i64 = entries.iter().map(|(_, level)| i64::from(level.value())).sum();
    let average = sum as f64 / entries.len() as f64;

    let mut distribution = BTreeMap::new();
    for (_, level) in &entries {
        *distribution.entry(level.as_str().to_string()).or_insert(0) += 1;
    }

    let mut best = entries[0];
    let mut worst = entries[0];
    for &entry in &entries[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
        if entry.1 < worst.1 {
            worst = entry;
        }
    }

    MoodStats {
        average_mood: (average * 100.0).round() / 100.0,
        total_records: entries.len(),
        mood_distribution: distribution,
        best_day: Some(best.0),
        worst_day: Some(worst.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{date, mood};

    #[test]
    fn test_empty_window() {
        let stats = mood_statistics(&[]);
        assert_eq!(stats.average_mood, 0.0);
        assert_eq!(stats.total_records, 0);
        assert!(stats.mood_distribution.is_empty());
        assert_eq!(stats.best_day, None);
        assert_eq!(stats.worst_day, None);
    }

    #[test]
    fn test_average_distribution_and_extremes() {
        let moods = vec![
            mood(date(2024, 1, 3), 4),
            mood(date(2024, 1, 1), 2),
            mood(date(2024, 1, 2), 5),
        ];
        let stats = mood_statistics(&moods);

        assert_eq!(stats.average_mood, 3.67);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.mood_distribution.get("good"), Some(&1));
        assert_eq!(stats.mood_distribution.get("bad"), Some(&1));
        assert_eq!(stats.mood_distribution.get("excellent"), Some(&1));
        assert_eq!(stats.best_day, Some(date(2024, 1, 2)));
        assert_eq!(stats.worst_day, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_ties_go_to_earliest_date() {
        let moods = vec![
            mood(date(2024, 1, 5), 3),
            mood(date(2024, 1, 2), 3),
            mood(date(2024, 1, 4), 3),
        ];
        let stats = mood_statistics(&moods);
        assert_eq!(stats.best_day, Some(date(2024, 1, 2)));
        assert_eq!(stats.worst_day, Some(date(2024, 1, 2)));
        assert_eq!(stats.mood_distribution.get("neutral"), Some(&3));
    }

    #[test]
    fn test_invalid_levels_are_skipped() {
        let moods = vec![mood(date(2024, 1, 1), 0), mood(date(2024, 1, 2), 4)];
        let stats = mood_statistics(&moods);
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.average_mood, 4.0);
    }
}
