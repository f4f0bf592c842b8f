use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use ferrum_domain as domain;
use log::debug;

/// File-backed workout store, one JSON document per user under a
/// caller-supplied root directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: &Path, profile: &domain::UserProfile) -> Self {
        Self {
            path: root.join(format!("{}.json", sanitize(&profile.email))),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize(email: &str) -> String {
    email
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl domain::WorkoutRepository for FileStore {
    fn read_workouts(&self) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no stored workouts at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(domain::StorageError::from(err).into()),
        };
        let raw: serde_json::Value = serde_json::from_str(&contents)
            .map_err(|err| domain::ReadError::Other(err.into()))?;
        Ok(domain::reconcile(&raw))
    }

    fn write_workouts(&self, workouts: &[domain::Workout]) -> Result<(), domain::WriteError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(domain::StorageError::from)?;
        }
        let contents = serde_json::to_string_pretty(workouts)
            .map_err(|err| domain::WriteError::Other(err.into()))?;
        fs::write(&self.path, contents).map_err(domain::StorageError::from)?;
        Ok(())
    }
}
