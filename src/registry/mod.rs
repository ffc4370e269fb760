pub mod http;
pub mod mock;

pub use http::HttpRegistryClient;
pub use mock::{MockRegistryClient, RegistryCall};

use thiserror::Error;

use crate::models::{
    BedAssignment, Confirmation, DoctorSuggestion, NewPatient, PatientRecord, PatientStatus,
    RegistryStatistics, ServerReply,
};

/// Failures below the business layer: the registry could not be reached,
/// or it answered with something that is not a registry reply.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Registry returned error (status {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Registry refused the request (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),
}

impl RegistryError {
    /// The request never produced a registry answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::HttpClient(_)
        )
    }
}

/// Patient registry and doctor suggestion services.
///
/// Reads return the payload or an error. Mutations return a
/// [`ServerReply`] whenever the registry answered, so business refusals
/// stay distinguishable from transport failures.
pub trait RegistryClient {
    /// `GET /patients`
    fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError>;

    /// `POST /add_patient`
    fn add_patient(&self, patient: &NewPatient)
        -> Result<ServerReply<Confirmation>, RegistryError>;

    /// `POST /api/suggest-doctor`
    fn suggest_doctors(&self, symptoms: &str) -> Result<Vec<DoctorSuggestion>, RegistryError>;

    /// `POST /update_status/{id}`
    fn update_status(
        &self,
        patient_id: &str,
        status: PatientStatus,
    ) -> Result<ServerReply<Confirmation>, RegistryError>;

    /// `GET /assign_bed/{id}`
    fn assign_bed(&self, patient_id: &str) -> Result<ServerReply<BedAssignment>, RegistryError>;

    /// `DELETE /api/delete_patient/{id}`
    fn delete_patient(&self, patient_id: &str)
        -> Result<ServerReply<Confirmation>, RegistryError>;

    /// `GET /api/statistics`
    fn statistics(&self) -> Result<RegistryStatistics, RegistryError>;
}
