//! HTTP client for the patient registry.
//!
//! Paths follow the console's client contract (`/patients`,
//! `/update_status/{id}`, `/assign_bed/{id}`), not the Flask app's
//! `/api/patients` and `/api/update_status` routes; only delete and
//! statistics live under `/api/`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Serialize;

use super::{RegistryClient, RegistryError};
use crate::models::{
    decode_payload, decode_reply, BedAssignment, Confirmation, DoctorSuggestion, NewPatient,
    PatientRecord, PatientStatus, RegistryStatistics, ServerReply,
};

const PATH_PATIENTS: &[&str] = &["patients"];
const PATH_ADD_PATIENT: &[&str] = &["add_patient"];
const PATH_SUGGEST_DOCTOR: &[&str] = &["api", "suggest-doctor"];
const PATH_UPDATE_STATUS: &[&str] = &["update_status"];
const PATH_ASSIGN_BED: &[&str] = &["assign_bed"];
const PATH_DELETE_PATIENT: &[&str] = &["api", "delete_patient"];
const PATH_STATISTICS: &[&str] = &["api", "statistics"];

/// Request body for `/api/suggest-doctor`
#[derive(Serialize)]
struct SuggestRequest<'a> {
    symptoms: &'a str,
}

/// Request body for `/update_status/{id}`
#[derive(Serialize)]
struct StatusRequest {
    status: PatientStatus,
}

/// HTTP client for the patient registry.
pub struct HttpRegistryClient {
    base_url: Url,
    client: Client,
    timeout_secs: u64,
}

impl HttpRegistryClient {
    /// Create a client rooted at `base_url` (any path prefix is kept).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RegistryError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|e| RegistryError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RegistryError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an endpoint URL; every segment is percent-encoded on its own.
    fn endpoint(&self, path: &[&str], id: Option<&str>) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RegistryError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(path);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Send a request and return `(status, body)` without judging either.
    fn execute(&self, request: RequestBuilder) -> Result<(u16, String), RegistryError> {
        let response = request.send().map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.transport_error(e))?;
        tracing::debug!(status, bytes = body.len(), "Registry responded");
        Ok((status, body))
    }

    fn transport_error(&self, e: reqwest::Error) -> RegistryError {
        if e.is_connect() {
            RegistryError::Connection(self.base_url.to_string())
        } else if e.is_timeout() {
            RegistryError::Timeout(self.timeout_secs)
        } else {
            RegistryError::HttpClient(e.to_string())
        }
    }
}

impl RegistryClient for HttpRegistryClient {
    fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError> {
        let url = self.endpoint(PATH_PATIENTS, None)?;
        let (status, body) = self.execute(self.client.get(url))?;
        decode_payload(status, &body)
    }

    fn add_patient(
        &self,
        patient: &NewPatient,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        let url = self.endpoint(PATH_ADD_PATIENT, None)?;
        let (status, body) = self.execute(self.client.post(url).json(patient))?;
        decode_reply(status, &body)
    }

    fn suggest_doctors(&self, symptoms: &str) -> Result<Vec<DoctorSuggestion>, RegistryError> {
        let url = self.endpoint(PATH_SUGGEST_DOCTOR, None)?;
        let request = self.client.post(url).json(&SuggestRequest { symptoms });
        let (status, body) = self.execute(request)?;
        decode_payload(status, &body)
    }

    fn update_status(
        &self,
        patient_id: &str,
        status: PatientStatus,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        let url = self.endpoint(PATH_UPDATE_STATUS, Some(patient_id))?;
        let request = self.client.post(url).json(&StatusRequest { status });
        let (code, body) = self.execute(request)?;
        decode_reply(code, &body)
    }

    fn assign_bed(&self, patient_id: &str) -> Result<ServerReply<BedAssignment>, RegistryError> {
        let url = self.endpoint(PATH_ASSIGN_BED, Some(patient_id))?;
        let (status, body) = self.execute(self.client.get(url))?;
        decode_reply(status, &body)
    }

    fn delete_patient(
        &self,
        patient_id: &str,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        let url = self.endpoint(PATH_DELETE_PATIENT, Some(patient_id))?;
        let (status, body) = self.execute(self.client.delete(url))?;
        decode_reply(status, &body)
    }

    fn statistics(&self) -> Result<RegistryStatistics, RegistryError> {
        let url = self.endpoint(PATH_STATISTICS, None)?;
        let (status, body) = self.execute(self.client.get(url))?;
        decode_payload(status, &body)
    }
}
