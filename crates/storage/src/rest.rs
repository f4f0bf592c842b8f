use ferrum_domain as domain;
use log::debug;
use reqwest::{Url, blocking::Client};
use serde_json::json;

/// Client for the spreadsheet-backed bulk sync endpoint.
///
/// The endpoint speaks a two-operation protocol: GET with an `email` query
/// parameter returns the stored workout list as a JSON array, POST with a
/// `{ email, workouts }` body replaces it. No credentials are attached
/// beyond the plaintext email, and nothing is retried.
pub struct SyncClient {
    client: Client,
    endpoint: Url,
    email: String,
}

impl SyncClient {
    #[must_use]
    pub fn new(endpoint: Url, profile: &domain::UserProfile) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            email: profile.email.clone(),
        }
    }

    fn download_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("email", &self.email);
        url
    }
}

impl domain::SyncRepository for SyncClient {
    fn download(&self) -> Result<serde_json::Value, domain::SyncError> {
        if self.email == domain::GUEST_EMAIL {
            return Err(domain::SyncError::Disabled);
        }
        debug!("downloading workouts for {}", self.email);
        let response = self
            .client
            .get(self.download_url())
            .send()
            .map_err(into_sync_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(domain::SyncError::Other(
                format!("unexpected status {status}").into(),
            ));
        }
        response
            .json()
            .map_err(|err| domain::SyncError::Other(err.into()))
    }

    fn upload(&self, workouts: &[domain::Workout]) -> Result<(), domain::SyncError> {
        if self.email == domain::GUEST_EMAIL {
            return Err(domain::SyncError::Disabled);
        }
        debug!(
            "uploading {} workouts for {}",
            workouts.len(),
            self.email
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload(&self.email, workouts))
            .send()
            .map_err(into_sync_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(domain::SyncError::Other(
                format!("unexpected status {status}").into(),
            ));
        }
        Ok(())
    }
}

fn payload(email: &str, workouts: &[domain::Workout]) -> serde_json::Value {
    json!({ "email": email, "workouts": workouts })
}

fn into_sync_error(err: reqwest::Error) -> domain::SyncError {
    if err.is_connect() || err.is_timeout() {
        domain::SyncError::Storage(domain::StorageError::NoConnection)
    } else {
        domain::SyncError::Other(err.into())
    }
}
