use std::collections::BTreeSet;

use chrono::{Duration, Local, NaiveDate};

use crate::{Name, Split, Weight, Workout, progression::latest_exercise};

#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum DefaultInterval {
    All,
    _3M = 90,
    _1M = 30,
}

#[must_use]
pub fn init_interval(dates: &[NaiveDate], default_interval: DefaultInterval) -> Interval {
    let today = Local::now().date_naive();
    let mut first = dates.iter().copied().min().unwrap_or(today);
    let last = dates.iter().copied().max().unwrap_or(today);

    if default_interval != DefaultInterval::All
        && last >= today - Duration::days(default_interval as i64)
    {
        first = today - Duration::days(default_interval as i64);
    };

    Interval { first, last: today }
}

/// Data points for the per-exercise progress chart: the maximal weight
/// lifted in each workout containing the exercise, date-ascending,
/// restricted to the interval.
#[must_use]
pub fn weight_series(
    workouts: &[Workout],
    exercise_name: &str,
    interval: &Interval,
) -> Vec<(NaiveDate, Weight)> {
    let mut series = workouts
        .iter()
        .filter(|w| (interval.first..=interval.last).contains(&w.date))
        .filter_map(|w| Some((w.date, w.max_weight(exercise_name)?)))
        .collect::<Vec<_>>();
    series.sort_by_key(|(date, _)| *date);
    series
}

/// Sorted unique exercise names across history, for suggestion lists.
/// Unnamed exercises are skipped.
#[must_use]
pub fn exercise_names(workouts: &[Workout]) -> Vec<Name> {
    workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .filter_map(|e| Name::new(&e.name).ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub split: Split,
    /// Exercises of the latest workout with a new top weight, or the same
    /// top weight at a better rep count, compared to the previous session
    /// of the same split.
    pub improved: usize,
    pub total: usize,
    /// Average percentage change of the top weight across the exercises
    /// present in both sessions.
    pub avg_gain_percent: f32,
}

/// Dashboard comparison of the latest workout against the most recent
/// earlier workout of the same split. `None` without such a pair.
#[must_use]
pub fn progress_report(workouts: &[Workout]) -> Option<ProgressReport> {
    let (latest, rest) = workouts.split_first()?;
    let previous = rest
        .iter()
        .filter(|w| w.split == latest.split)
        .collect::<Vec<_>>();
    if previous.is_empty() {
        return None;
    }

    let mut improved = 0;
    let mut gain_percent_total = 0.0;
    let mut compared = 0;

    for exercise in &latest.exercises {
        let Some(previous_exercise) = previous.iter().find_map(|w| w.exercise(&exercise.name))
        else {
            continue;
        };
        let (Some(current_max), Some(previous_max)) =
            (exercise.max_weight(), previous_exercise.max_weight())
        else {
            continue;
        };

        if current_max > previous_max
            || (current_max == previous_max
                && exercise.best_reps_at(current_max) > previous_exercise.best_reps_at(previous_max))
        {
            improved += 1;
        }
        if f32::from(previous_max) > 0.0 {
            gain_percent_total +=
                (f32::from(current_max) - f32::from(previous_max)) / f32::from(previous_max) * 100.0;
            compared += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_gain_percent = if compared > 0 {
        gain_percent_total / compared as f32
    } else {
        0.0
    };

    Some(ProgressReport {
        split: latest.split,
        improved,
        total: latest.exercises.len(),
        avg_gain_percent,
    })
}

/// Number of blank sets to prefill when adding an exercise to a new
/// session: the set count of its most recent occurrence, else one.
#[must_use]
pub fn set_count_template(workouts: &[Workout], exercise_name: &str) -> usize {
    latest_exercise(workouts, exercise_name).map_or(1, |e| e.sets.len())
}

/// Split rotation for a new session: the opposite of the newest workout's
/// split, `A` for empty history.
#[must_use]
pub fn next_split(workouts: &[Workout]) -> Split {
    workouts.first().map_or(Split::A, |w| w.split.other())
}
