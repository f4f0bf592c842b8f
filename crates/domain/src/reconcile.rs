use std::collections::HashMap;

use serde_json::Value;

use crate::{Workout, WorkoutID};

/// Convert an untrusted JSON payload into typed workouts.
///
/// Anything other than an array yields no workouts. Array elements are
/// decoded independently, so a single bad element never fails the batch:
/// elements that are not objects, lack a non-empty `id`, carry a `date`
/// that is not a calendar date, or contain out-of-range values are dropped.
#[must_use]
pub fn parse_workouts(raw: &Value) -> Vec<Workout> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

/// Deduplicate workouts by id and order them by date, newest first.
///
/// When two workouts share an id, the later one by input position wins.
/// Replacement keeps the position of the first occurrence, so workouts
/// with equal dates stay in first-seen order after the stable sort.
#[must_use]
pub fn merge<I>(workouts: I) -> Vec<Workout>
where
    I: IntoIterator<Item = Workout>,
{
    let mut canonical: Vec<Workout> = Vec::new();
    let mut positions: HashMap<WorkoutID, usize> = HashMap::new();

    for workout in workouts {
        match positions.get(&workout.id) {
            Some(&position) => canonical[position] = workout,
            None => {
                positions.insert(workout.id.clone(), canonical.len());
                canonical.push(workout);
            }
        }
    }

    canonical.sort_by(|a, b| b.date.cmp(&a.date));
    canonical
}

/// The canonical list for an untrusted payload: parse, deduplicate, sort.
#[must_use]
pub fn reconcile(raw: &Value) -> Vec<Workout> {
    merge(parse_workouts(raw))
}
