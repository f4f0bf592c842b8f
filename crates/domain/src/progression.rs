use crate::{Exercise, Weight, Workout, name::canonical};

/// Reps at the top weight required before the target weight increases.
pub const REP_TARGET: u32 = 10;

/// Weight added to the target when the rep target is met, in kilograms.
pub const WEIGHT_INCREMENT: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Progress,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub target_weight: Weight,
    pub mode: Mode,
}

/// The most recent occurrence of a named exercise with at least one
/// recorded set. History is expected newest-first; an occurrence without
/// sets does not end the scan.
#[must_use]
pub fn latest_exercise<'a>(history: &'a [Workout], exercise_name: &str) -> Option<&'a Exercise> {
    let name = canonical(exercise_name);
    history
        .iter()
        .filter_map(|w| w.exercises.iter().find(|e| canonical(&e.name) == name))
        .find(|e| !e.sets.is_empty())
}

/// Recommend the working weight for the next occurrence of an exercise.
///
/// Only the most recent occurrence counts; there is no aggregation across
/// sessions. The top weight of that occurrence is held until at least
/// [`REP_TARGET`] reps were achieved in a set at that weight, then raised
/// by [`WEIGHT_INCREMENT`].
#[must_use]
pub fn recommend(history: &[Workout], exercise_name: &str) -> Option<Recommendation> {
    let exercise = latest_exercise(history, exercise_name)?;
    let last_max_weight = exercise.max_weight()?;
    let last_reps_at_max = exercise.best_reps_at(last_max_weight)?;

    if u32::from(last_reps_at_max) >= REP_TARGET {
        let target = Weight::new(f32::from(last_max_weight) + WEIGHT_INCREMENT)
            .unwrap_or(last_max_weight);
        Some(Recommendation {
            target_weight: target,
            mode: Mode::Progress,
        })
    } else {
        Some(Recommendation {
            target_weight: last_max_weight,
            mode: Mode::Hold,
        })
    }
}

/// Estimated one-rep max for the most recent occurrence of an exercise,
/// using the Brzycki formula per set. Display metric only; it has no
/// influence on [`recommend`].
#[must_use]
pub fn one_rep_max(history: &[Workout], exercise_name: &str) -> Option<Weight> {
    let exercise = latest_exercise(history, exercise_name)?;
    exercise
        .sets
        .iter()
        .filter_map(|set| {
            let reps = u32::from(set.reps);
            if reps == 0 {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let denominator = 1.0278 - 0.0278 * reps as f32;
            // The formula degenerates at 37+ reps.
            if denominator <= 0.0 {
                return None;
            }
            Some(f32::from(set.weight) / denominator)
        })
        .max_by(f32::total_cmp)
        .and_then(|estimate| Weight::new(estimate).ok())
}
