use std::fmt::Write as _;

use chrono::NaiveDate;
use derive_more::{AsRef, Display, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ReadError, SyncError, WriteError, name::canonical};

pub trait WorkoutRepository {
    fn read_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    fn write_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError>;
}

pub trait SyncRepository {
    fn download(&self) -> Result<serde_json::Value, SyncError>;
    fn upload(&self, workouts: &[Workout]) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: WorkoutID,
    pub date: NaiveDate,
    #[serde(default, rename = "type")]
    pub split: Split,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_weight: Option<Weight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Workout {
    #[must_use]
    pub fn exercise(&self, name: &str) -> Option<&Exercise> {
        let name = canonical(name);
        self.exercises.iter().find(|e| canonical(&e.name) == name)
    }

    #[must_use]
    pub fn max_weight(&self, name: &str) -> Option<Weight> {
        self.exercise(name)?.max_weight()
    }

    /// Whether the workout matches a free-text history search. The query is
    /// compared case-insensitively against the exercise names and the ISO
    /// date.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.date.to_string().contains(&query)
            || self
                .exercises
                .iter()
                .any(|e| e.name.to_lowercase().contains(&query))
    }

    /// Plain-text export of the workout, one line per exercise.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!("{} - {}\n", self.date, self.split);
        for exercise in &self.exercises {
            let sets = exercise
                .sets
                .iter()
                .map(|s| format!("{}x{}", s.reps, s.weight))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(text, "{} {sets}", exercise.name);
        }
        text
    }
}

#[derive(
    AsRef, Debug, Display, Clone, Into, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct WorkoutID(String);

impl WorkoutID {
    pub fn new(value: &str) -> Result<Self, WorkoutIDError> {
        Self::try_from(value.to_string())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl TryFrom<String> for WorkoutID {
    type Error = WorkoutIDError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(WorkoutIDError::Empty);
        }

        Ok(Self(value))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutIDError {
    #[error("Workout ID must not be empty")]
    Empty,
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Split {
    #[default]
    A,
    B,
}

impl Split {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Split::A => Split::B,
            Split::B => Split::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

impl Exercise {
    #[must_use]
    pub fn max_weight(&self) -> Option<Weight> {
        self.sets
            .iter()
            .map(|s| s.weight)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Best rep count among the sets performed at the given weight.
    #[must_use]
    pub fn best_reps_at(&self, weight: Weight) -> Option<Reps> {
        self.sets
            .iter()
            .filter(|s| s.weight == weight)
            .map(|s| s.reps)
            .max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub reps: Reps,
    pub weight: Weight,
}

#[derive(
    Debug,
    Default,
    Display,
    Clone,
    Copy,
    Into,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<u32> for Reps {
    type Error = RepsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Reps::new(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for Weight {
    type Error = WeightError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be a non-negative number")]
    OutOfRange,
    #[error("Weight must be a decimal number")]
    ParseError,
}
