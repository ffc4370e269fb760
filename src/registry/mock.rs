//! In-memory registry used by tests and offline demos.
//!
//! Behaves like the real registry for the happy paths (status updates
//! change the stored record, added patients show up in the next list) and
//! records every call so tests can assert on request order.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{RegistryClient, RegistryError};
use crate::models::{
    BedAssignment, Confirmation, DoctorSuggestion, NewPatient, PatientRecord, PatientStatus,
    RegistryStatistics, ReplyErrorKind, ServerReply,
};

/// Doctor assigned when no scripted reply says otherwise.
pub const MOCK_DEFAULT_DOCTOR: &str = "Dr. Ahuja (General Practitioner)";

/// One request seen by [`MockRegistryClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryCall {
    ListPatients,
    AddPatient(NewPatient),
    SuggestDoctors(String),
    UpdateStatus { patient_id: String, status: PatientStatus },
    AssignBed(String),
    DeletePatient(String),
    Statistics,
}

pub struct MockRegistryClient {
    patients: RefCell<Vec<PatientRecord>>,
    calls: RefCell<Vec<RegistryCall>>,
    next_bed: RefCell<u32>,
    unreachable: bool,
    suggestions: Vec<DoctorSuggestion>,
    add_reply: Option<ServerReply<Confirmation>>,
    status_reply: Option<ServerReply<Confirmation>>,
    bed_reply: Option<ServerReply<BedAssignment>>,
}

impl MockRegistryClient {
    pub fn new(patients: Vec<PatientRecord>) -> Self {
        Self {
            patients: RefCell::new(patients),
            calls: RefCell::new(Vec::new()),
            next_bed: RefCell::new(1),
            unreachable: false,
            suggestions: Vec::new(),
            add_reply: None,
            status_reply: None,
            bed_reply: None,
        }
    }

    /// Every call fails as if the registry host were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<DoctorSuggestion>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_add_reply(mut self, reply: ServerReply<Confirmation>) -> Self {
        self.add_reply = Some(reply);
        self
    }

    pub fn with_status_reply(mut self, reply: ServerReply<Confirmation>) -> Self {
        self.status_reply = Some(reply);
        self
    }

    pub fn with_bed_reply(mut self, reply: ServerReply<BedAssignment>) -> Self {
        self.bed_reply = Some(reply);
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.borrow().clone()
    }

    /// Current server-side patient list.
    pub fn patients(&self) -> Vec<PatientRecord> {
        self.patients.borrow().clone()
    }

    fn record(&self, call: RegistryCall) -> Result<(), RegistryError> {
        self.calls.borrow_mut().push(call);
        if self.unreachable {
            return Err(RegistryError::Connection("mock://registry".into()));
        }
        Ok(())
    }

    fn not_found<T>() -> ServerReply<T> {
        ServerReply::Err {
            kind: ReplyErrorKind::NotFound,
            detail: "Patient not found".into(),
        }
    }
}

impl Default for MockRegistryClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RegistryClient for MockRegistryClient {
    fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError> {
        self.record(RegistryCall::ListPatients)?;
        Ok(self.patients())
    }

    fn add_patient(
        &self,
        patient: &NewPatient,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        self.record(RegistryCall::AddPatient(patient.clone()))?;
        if let Some(reply) = &self.add_reply {
            return Ok(reply.clone());
        }

        let mut patients = self.patients.borrow_mut();
        let id = format!("{:08x}", patients.len() + 1);
        let mut record = PatientRecord::new(
            id.clone(),
            patient.name.clone(),
            Some(patient.phone.as_str()),
            MOCK_DEFAULT_DOCTOR,
            PatientStatus::Pending,
        );
        record.symptoms = Some(patient.symptoms.clone());
        record.appointment_time = Some(patient.appointment_time.clone());
        patients.push(record);

        let mut confirmation =
            Confirmation::new("✅ Patient added").with_doctor(MOCK_DEFAULT_DOCTOR);
        confirmation.patient_id = Some(id);
        Ok(ServerReply::Ok(confirmation))
    }

    fn suggest_doctors(&self, symptoms: &str) -> Result<Vec<DoctorSuggestion>, RegistryError> {
        self.record(RegistryCall::SuggestDoctors(symptoms.to_string()))?;
        Ok(self.suggestions.clone())
    }

    fn update_status(
        &self,
        patient_id: &str,
        status: PatientStatus,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        self.record(RegistryCall::UpdateStatus {
            patient_id: patient_id.to_string(),
            status,
        })?;
        if let Some(reply) = &self.status_reply {
            return Ok(reply.clone());
        }

        let mut patients = self.patients.borrow_mut();
        match patients.iter_mut().find(|p| p.id == patient_id) {
            Some(patient) => {
                patient.status = status;
                Ok(ServerReply::Ok(Confirmation::new("✅ Status updated")))
            }
            None => Ok(Self::not_found()),
        }
    }

    fn assign_bed(&self, patient_id: &str) -> Result<ServerReply<BedAssignment>, RegistryError> {
        self.record(RegistryCall::AssignBed(patient_id.to_string()))?;
        if let Some(reply) = &self.bed_reply {
            return Ok(reply.clone());
        }
        if !self.patients.borrow().iter().any(|p| p.id == patient_id) {
            return Ok(Self::not_found());
        }

        let mut next = self.next_bed.borrow_mut();
        let bed_number = format!("B-{next}");
        *next += 1;
        Ok(ServerReply::Ok(BedAssignment { bed_number }))
    }

    fn delete_patient(
        &self,
        patient_id: &str,
    ) -> Result<ServerReply<Confirmation>, RegistryError> {
        self.record(RegistryCall::DeletePatient(patient_id.to_string()))?;
        let mut patients = self.patients.borrow_mut();
        let before = patients.len();
        patients.retain(|p| p.id != patient_id);
        if patients.len() == before {
            return Ok(Self::not_found());
        }
        Ok(ServerReply::Ok(Confirmation::new("✅ Patient deleted")))
    }

    fn statistics(&self) -> Result<RegistryStatistics, RegistryError> {
        self.record(RegistryCall::Statistics)?;
        let patients = self.patients.borrow();
        let mut by_status = BTreeMap::new();
        let mut by_doctor = BTreeMap::new();
        for patient in patients.iter() {
            *by_status.entry(patient.status.to_string()).or_insert(0) += 1;
            *by_doctor.entry(patient.doctor.clone()).or_insert(0) += 1;
        }
        Ok(RegistryStatistics {
            total_patients: patients.len() as u64,
            by_status,
            by_doctor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MockRegistryClient {
        MockRegistryClient::new(vec![
            PatientRecord::new("1", "A", Some("555"), "Dr X", PatientStatus::Pending),
            PatientRecord::new("2", "B", None, "Dr Y", PatientStatus::Admitted),
        ])
    }

    #[test]
    fn status_update_changes_stored_record() {
        let mock = sample();
        let reply = mock.update_status("1", PatientStatus::Discharged).unwrap();
        assert!(reply.is_ok());
        assert_eq!(mock.patients()[0].status, PatientStatus::Discharged);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let mock = sample();
        assert!(!mock.update_status("9", PatientStatus::Admitted).unwrap().is_ok());
        assert!(!mock.assign_bed("9").unwrap().is_ok());
        assert!(!mock.delete_patient("9").unwrap().is_ok());
    }

    #[test]
    fn beds_are_numbered_in_order() {
        let mock = sample();
        assert_eq!(mock.assign_bed("1").unwrap().ok().unwrap().bed_number, "B-1");
        assert_eq!(mock.assign_bed("2").unwrap().ok().unwrap().bed_number, "B-2");
    }

    #[test]
    fn unreachable_mock_records_then_fails() {
        let mock = sample().unreachable();
        assert!(mock.list_patients().unwrap_err().is_transport());
        assert_eq!(mock.calls(), vec![RegistryCall::ListPatients]);
    }

    #[test]
    fn statistics_count_by_status_and_doctor() {
        let stats = sample().statistics().unwrap();
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.by_status["Pending"], 1);
        assert_eq!(stats.by_doctor["Dr Y"], 1);
    }
}
