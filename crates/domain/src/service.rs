use chrono::NaiveDate;
use log::{debug, error};
use serde_json::Value;

use crate::{
    ReadError, Reps, StorageError, SyncError, SyncRepository, UserProfile, ValidationError, Weight,
    Workout, WorkoutID, WorkoutRepository, WriteError, merge, parse_workouts, reconcile,
};

pub trait WorkoutService {
    fn workouts(&self) -> Result<Vec<Workout>, ReadError>;

    /// Add a workout, or fully replace the stored one with the same id.
    fn save_workout(&self, workout: Workout) -> Result<Vec<Workout>, WriteError>;

    fn delete_workout(&self, id: &WorkoutID) -> Result<Vec<Workout>, WriteError>;

    /// Merge an untrusted JSON payload into the stored list.
    fn import_workouts(&self, raw: &Value) -> Result<Vec<Workout>, WriteError>;

    /// Replace the stored list with the reconciled remote payload.
    fn sync_workouts(&self) -> Result<Vec<Workout>, SyncError>;

    fn validate_date(&self, date: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::Other("Invalid date".into()))
    }

    fn validate_weight(&self, weight: &str) -> Result<Weight, ValidationError> {
        Weight::try_from(weight).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_reps(&self, reps: &str) -> Result<Reps, ValidationError> {
        Reps::try_from(reps).map_err(|err| ValidationError::Other(err.into()))
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

pub struct Service<R> {
    repository: R,
    profile: UserProfile,
}

impl<R> Service<R> {
    pub fn new(repository: R, profile: UserProfile) -> Self {
        Self {
            repository,
            profile,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }
}

impl<R> Service<R>
where
    R: WorkoutRepository + SyncRepository,
{
    fn store(&self, workouts: Vec<Workout>) -> Result<Vec<Workout>, WriteError> {
        log_on_error!(
            self.repository.write_workouts(&workouts),
            WriteError,
            "write",
            "workouts"
        )?;
        self.push(&workouts);
        Ok(workouts)
    }

    /// Fire-and-forget upload after a local mutation. Failures are logged,
    /// never surfaced, and nothing is retried.
    fn push(&self, workouts: &[Workout]) {
        if self.profile.is_guest() {
            return;
        }
        match self.repository.upload(workouts) {
            Ok(()) => {}
            Err(SyncError::Storage(StorageError::NoConnection)) => {
                debug!("upload skipped: no connection");
            }
            Err(err) => error!("failed to upload workouts: {err}"),
        }
    }
}

impl<R> WorkoutService for Service<R>
where
    R: WorkoutRepository + SyncRepository,
{
    fn workouts(&self) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(
            self.repository.read_workouts(),
            ReadError,
            "read",
            "workouts"
        )
    }

    fn save_workout(&self, workout: Workout) -> Result<Vec<Workout>, WriteError> {
        let current = self.repository.read_workouts().map_err(WriteError::from)?;
        self.store(merge(current.into_iter().chain([workout])))
    }

    fn delete_workout(&self, id: &WorkoutID) -> Result<Vec<Workout>, WriteError> {
        let mut workouts = self.repository.read_workouts().map_err(WriteError::from)?;
        workouts.retain(|w| &w.id != id);
        self.store(workouts)
    }

    fn import_workouts(&self, raw: &Value) -> Result<Vec<Workout>, WriteError> {
        let current = self.repository.read_workouts().map_err(WriteError::from)?;
        self.store(merge(current.into_iter().chain(parse_workouts(raw))))
    }

    fn sync_workouts(&self) -> Result<Vec<Workout>, SyncError> {
        if self.profile.is_guest() {
            return Err(SyncError::Disabled);
        }
        let payload = log_on_error!(self.repository.download(), SyncError, "download", "workouts")?;
        let workouts = reconcile(&payload);
        self.repository
            .write_workouts(&workouts)
            .map_err(SyncError::from)?;
        Ok(workouts)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::Split;

    use super::*;

    struct FakeRepository {
        stored: RefCell<Vec<Workout>>,
        remote: Value,
        uploads: RefCell<Vec<Vec<Workout>>>,
    }

    impl FakeRepository {
        fn new(stored: Vec<Workout>, remote: Value) -> Self {
            Self {
                stored: RefCell::new(stored),
                remote,
                uploads: RefCell::new(vec![]),
            }
        }
    }

    impl WorkoutRepository for FakeRepository {
        fn read_workouts(&self) -> Result<Vec<Workout>, ReadError> {
            Ok(self.stored.borrow().clone())
        }

        fn write_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError> {
            *self.stored.borrow_mut() = workouts.to_vec();
            Ok(())
        }
    }

    impl SyncRepository for FakeRepository {
        fn download(&self) -> Result<Value, SyncError> {
            Ok(self.remote.clone())
        }

        fn upload(&self, workouts: &[Workout]) -> Result<(), SyncError> {
            self.uploads.borrow_mut().push(workouts.to_vec());
            Ok(())
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            picture: String::new(),
        }
    }

    fn workout(id: &str, date: &str) -> Workout {
        Workout {
            id: WorkoutID::new(id).unwrap(),
            date: date.parse().unwrap(),
            split: Split::A,
            exercises: vec![],
            user_weight: None,
            duration: None,
        }
    }

    fn ids(workouts: &[Workout]) -> Vec<String> {
        workouts.iter().map(|w| w.id.to_string()).collect()
    }

    #[test]
    fn test_save_workout_merges_and_uploads() {
        let service = Service::new(
            FakeRepository::new(vec![workout("a", "2024-03-01")], json!([])),
            profile(),
        );
        let result = service.save_workout(workout("b", "2024-03-08")).unwrap();
        assert_eq!(ids(&result), vec!["b", "a"]);
        assert_eq!(ids(&service.repository.stored.borrow()), vec!["b", "a"]);
        assert_eq!(service.repository.uploads.borrow().len(), 1);
    }

    #[test]
    fn test_save_workout_replaces_by_id() {
        let service = Service::new(
            FakeRepository::new(vec![workout("a", "2024-03-01")], json!([])),
            profile(),
        );
        let result = service.save_workout(workout("a", "2024-03-02")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].date, "2024-03-02".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_delete_workout() {
        let service = Service::new(
            FakeRepository::new(
                vec![workout("a", "2024-03-01"), workout("b", "2024-02-01")],
                json!([]),
            ),
            profile(),
        );
        let result = service.delete_workout(&WorkoutID::new("a").unwrap()).unwrap();
        assert_eq!(ids(&result), vec!["b"]);
        assert_eq!(service.repository.uploads.borrow().len(), 1);
    }

    #[test]
    fn test_import_workouts_merges_into_current() {
        let service = Service::new(
            FakeRepository::new(vec![workout("a", "2024-03-01")], json!([])),
            profile(),
        );
        let result = service
            .import_workouts(&json!([
                {"id": "b", "date": "2024-02-01"},
                null,
            ]))
            .unwrap();
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn test_sync_workouts_replaces_local_content() {
        // The fetched payload alone defines the new canonical list: the
        // remote copy of "a" wins and local-only records are gone.
        let service = Service::new(
            FakeRepository::new(
                vec![workout("a", "2024-03-01"), workout("local", "2024-01-01")],
                json!([
                    {"id": "a", "date": "2024-03-02"},
                    {"id": "b", "date": "2024-02-01"},
                ]),
            ),
            profile(),
        );
        let result = service.sync_workouts().unwrap();
        assert_eq!(ids(&result), vec!["a", "b"]);
        assert_eq!(result[0].date, "2024-03-02".parse::<NaiveDate>().unwrap());
        assert_eq!(ids(&service.repository.stored.borrow()), vec!["a", "b"]);
        assert!(service.repository.uploads.borrow().is_empty());
    }

    #[test]
    fn test_sync_workouts_disabled_for_guests() {
        let service = Service::new(
            FakeRepository::new(vec![], json!([])),
            UserProfile::guest(),
        );
        assert!(matches!(service.sync_workouts(), Err(SyncError::Disabled)));
    }

    #[test]
    fn test_no_upload_for_guests() {
        let service = Service::new(
            FakeRepository::new(vec![], json!([])),
            UserProfile::guest(),
        );
        service.save_workout(workout("a", "2024-03-01")).unwrap();
        assert!(service.repository.uploads.borrow().is_empty());
    }

    struct Validator;
    impl WorkoutService for Validator {
        fn workouts(&self) -> Result<Vec<Workout>, ReadError> {
            unimplemented!()
        }
        fn save_workout(&self, _: Workout) -> Result<Vec<Workout>, WriteError> {
            unimplemented!()
        }
        fn delete_workout(&self, _: &WorkoutID) -> Result<Vec<Workout>, WriteError> {
            unimplemented!()
        }
        fn import_workouts(&self, _: &Value) -> Result<Vec<Workout>, WriteError> {
            unimplemented!()
        }
        fn sync_workouts(&self) -> Result<Vec<Workout>, SyncError> {
            unimplemented!()
        }
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            Validator.validate_date(" 2024-03-01 ").unwrap(),
            "2024-03-01".parse::<NaiveDate>().unwrap()
        );
        assert!(Validator.validate_date("01.03.2024").is_err());
    }

    #[test]
    fn test_validate_weight_accepts_decimal_comma() {
        assert_eq!(
            Validator.validate_weight("82,5").unwrap(),
            Weight::new(82.5).unwrap()
        );
        assert!(Validator.validate_weight("heavy").is_err());
    }

    #[test]
    fn test_validate_reps() {
        assert_eq!(
            Validator.validate_reps("12").unwrap(),
            Reps::new(12).unwrap()
        );
        assert!(Validator.validate_reps("12.5").is_err());
    }
}
