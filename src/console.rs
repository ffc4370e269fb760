//! The patient console: cached patient list, filters, intake form and the
//! registry round trips that keep them in step.
//!
//! All state lives in one owned [`ConsoleState`]. The cache is replaced
//! wholesale by [`PatientConsole::load_patients`] and by nothing else;
//! filtering and rendering only read it. Every mutation (status update,
//! bed assignment, deletion) is followed by a full reload so the table
//! always reflects the registry after the round trip.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::config::FilterRetention;
use crate::events::ConsoleEvent;
use crate::filter::{distinct_doctors, filter_patients};
use crate::form::{check_age_range, validate_form, FormError, IntakeForm, FIELD_SYMPTOMS};
use crate::models::{
    BedAssignment, Confirmation, PatientFilter, PatientRecord, PatientStatus, RegistryStatistics,
    ReplyErrorKind, ServerReply,
};
use crate::notify::Notifier;
use crate::registry::{RegistryClient, RegistryError};
use crate::view::{render_table, DoctorDropdown, PatientTable, SuggestionList};

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Result of pressing submit on the intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    /// The registry added the patient.
    Accepted(Confirmation),
    /// The registry answered with an error.
    Refused {
        kind: ReplyErrorKind,
        detail: String,
    },
}

/// Everything the console shows, owned in one place.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    /// Last fetched patient list, in registry order.
    pub cache: Vec<PatientRecord>,
    /// When `cache` was last replaced.
    pub loaded_at: Option<DateTime<Local>>,
    pub filter: PatientFilter,
    pub form: IntakeForm,
    pub table: PatientTable,
    pub doctor_dropdown: DoctorDropdown,
    pub suggestions: SuggestionList,
}

pub struct PatientConsole<C, N> {
    registry: C,
    notifier: N,
    retention: FilterRetention,
    state: ConsoleState,
}

impl<C: RegistryClient, N: Notifier> PatientConsole<C, N> {
    pub fn new(registry: C, notifier: N, retention: FilterRetention) -> Self {
        Self {
            registry,
            notifier,
            retention,
            state: ConsoleState::default(),
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn table(&self) -> &PatientTable {
        &self.state.table
    }

    pub fn registry(&self) -> &C {
        &self.registry
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn form_mut(&mut self) -> &mut IntakeForm {
        &mut self.state.form
    }

    // ── Patient list ─────────────────────────────────────────

    /// Fetch the full list, replace the cache, rebuild the doctor dropdown
    /// and render. Returns the number of cached records.
    pub fn load_patients(&mut self) -> Result<usize, ConsoleError> {
        let records = match self.registry.list_patients() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Patient list fetch failed");
                self.notifier
                    .alert(&format!("Could not load patients: {e}"));
                return Err(e.into());
            }
        };

        self.state.cache = records;
        self.state.loaded_at = Some(Local::now());
        self.populate_doctor_filter();

        match self.retention {
            FilterRetention::Reset => self.state.filter = PatientFilter::default(),
            FilterRetention::Preserve => {
                // A rebuilt dropdown cannot keep a doctor it no longer lists.
                let gone = self
                    .state
                    .filter
                    .doctor
                    .as_deref()
                    .is_some_and(|d| !self.state.doctor_dropdown.contains(d));
                if gone {
                    self.state.filter.doctor = None;
                }
            }
        }
        self.apply_filters();

        let count = self.state.cache.len();
        tracing::info!(count, shown = self.state.table.len(), "Patient list loaded");
        Ok(count)
    }

    /// Rebuild the doctor dropdown from the doctors present in the cache.
    pub fn populate_doctor_filter(&mut self) {
        let doctors = distinct_doctors(&self.state.cache);
        self.state.doctor_dropdown = DoctorDropdown::from_doctors(doctors);
    }

    /// Re-render the table from the cache and the current filter.
    pub fn apply_filters(&mut self) -> &PatientTable {
        let matching = filter_patients(&self.state.cache, &self.state.filter);
        tracing::debug!(
            active = !self.state.filter.is_empty(),
            matched = matching.len(),
            cached = self.state.cache.len(),
            "Filter applied"
        );
        self.state.table = render_table(matching);
        &self.state.table
    }

    /// Replace all four filter inputs at once and re-render.
    pub fn set_filter(&mut self, filter: PatientFilter) -> &PatientTable {
        self.state.filter = filter;
        self.apply_filters()
    }

    // ── Intake form ──────────────────────────────────────────

    /// Ask the suggestion service for doctors matching `symptoms` and
    /// replace the suggestion list with the answer.
    pub fn suggest_doctors(&mut self, symptoms: &str) -> Result<&SuggestionList, ConsoleError> {
        if symptoms.trim().is_empty() {
            self.state.suggestions.clear();
            return Ok(&self.state.suggestions);
        }

        match self.registry.suggest_doctors(symptoms) {
            Ok(suggestions) => {
                tracing::debug!(count = suggestions.len(), "Doctor suggestions received");
                self.state.suggestions.replace(&suggestions);
                Ok(&self.state.suggestions)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Doctor suggestion failed");
                self.notifier
                    .alert(&format!("Could not fetch doctor suggestions: {e}"));
                Err(e.into())
            }
        }
    }

    /// Validate the form and post it to the registry.
    ///
    /// Whenever the registry answers, success or refusal, the form is reset
    /// and suggestions are cleared. If the registry cannot be reached the
    /// form is kept so the operator can retry.
    pub fn submit_appointment(&mut self) -> Result<SubmitOutcome, ConsoleError> {
        if !validate_form(&mut self.state.form, &mut self.notifier) {
            return Ok(SubmitOutcome::Invalid);
        }
        if !check_age_range(&mut self.state.form, &mut self.notifier) {
            return Ok(SubmitOutcome::Invalid);
        }

        let patient = self.state.form.submission();
        let reply = match self.registry.add_patient(&patient) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Add patient request failed");
                self.notifier
                    .alert(&format!("Patient was not saved: {e}"));
                return Err(e.into());
            }
        };

        let outcome = match reply {
            ServerReply::Ok(confirmation) => {
                tracing::info!(
                    patient_id = confirmation.patient_id.as_deref().unwrap_or("-"),
                    "Patient added"
                );
                let message = match &confirmation.doctor {
                    Some(doctor) => {
                        format!("{}\nSuggested Doctor: {doctor}", confirmation.message)
                    }
                    None => confirmation.message.clone(),
                };
                self.notifier.alert(&message);
                SubmitOutcome::Accepted(confirmation)
            }
            ServerReply::Err { kind, detail } => {
                tracing::warn!(%kind, detail = %detail, "Registry refused new patient");
                self.notifier.alert(&detail);
                SubmitOutcome::Refused { kind, detail }
            }
        };

        self.state.form.reset();
        self.state.suggestions.clear();
        Ok(outcome)
    }

    // ── Mutations (each followed by a reload) ────────────────

    pub fn update_status(
        &mut self,
        patient_id: &str,
        status: PatientStatus,
    ) -> Result<ServerReply<Confirmation>, ConsoleError> {
        tracing::info!(patient_id, %status, "Updating status");
        let result = self.registry.update_status(patient_id, status);
        let reply = self.report(result, |c| c.message.clone());
        self.finish_mutation(reply)
    }

    pub fn assign_bed(
        &mut self,
        patient_id: &str,
    ) -> Result<ServerReply<BedAssignment>, ConsoleError> {
        tracing::info!(patient_id, "Assigning bed");
        let result = self.registry.assign_bed(patient_id);
        let reply = self.report(result, |bed| format!("✅ Bed assigned: {}", bed.bed_number));
        self.finish_mutation(reply)
    }

    pub fn delete_patient(
        &mut self,
        patient_id: &str,
    ) -> Result<ServerReply<Confirmation>, ConsoleError> {
        tracing::info!(patient_id, "Deleting patient");
        let result = self.registry.delete_patient(patient_id);
        let reply = self.report(result, |c| c.message.clone());
        self.finish_mutation(reply)
    }

    pub fn statistics(&mut self) -> Result<RegistryStatistics, ConsoleError> {
        self.registry.statistics().map_err(|e| {
            tracing::warn!(error = %e, "Statistics request failed");
            self.notifier
                .alert(&format!("Could not load statistics: {e}"));
            e.into()
        })
    }

    /// Surface a mutation outcome to the operator.
    fn report<T>(
        &mut self,
        result: Result<ServerReply<T>, RegistryError>,
        success_message: impl FnOnce(&T) -> String,
    ) -> Result<ServerReply<T>, RegistryError> {
        match &result {
            Ok(ServerReply::Ok(value)) => self.notifier.alert(&success_message(value)),
            Ok(ServerReply::Err { kind, detail }) => {
                tracing::warn!(%kind, detail = %detail, "Registry refused request");
                self.notifier.alert(detail);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registry request failed");
                self.notifier
                    .alert(&format!("Registry request failed: {e}"));
            }
        }
        result
    }

    /// Reload unconditionally, then hand back the mutation outcome. A
    /// mutation failure takes precedence over a reload failure.
    fn finish_mutation<T>(
        &mut self,
        reply: Result<ServerReply<T>, RegistryError>,
    ) -> Result<ServerReply<T>, ConsoleError> {
        let reloaded = self.load_patients();
        let reply = reply?;
        reloaded?;
        Ok(reply)
    }

    // ── Event dispatch ───────────────────────────────────────

    /// Route an operator interaction to its operation.
    pub fn dispatch(&mut self, event: ConsoleEvent) -> Result<(), ConsoleError> {
        tracing::debug!(?event, "Dispatching console event");
        match event {
            ConsoleEvent::Ready | ConsoleEvent::ReloadRequested => {
                self.load_patients()?;
            }
            ConsoleEvent::IdQueryChanged(query) => {
                self.state.filter.id_query = query;
                self.apply_filters();
            }
            ConsoleEvent::PhoneQueryChanged(query) => {
                self.state.filter.phone_query = query;
                self.apply_filters();
            }
            ConsoleEvent::DoctorSelected(doctor) => {
                self.state.filter.doctor = doctor;
                self.apply_filters();
            }
            ConsoleEvent::StatusFilterSelected(status) => {
                self.state.filter.status = status;
                self.apply_filters();
            }
            ConsoleEvent::FiltersCleared => {
                self.set_filter(PatientFilter::default());
            }
            ConsoleEvent::FieldEdited { field, value } => {
                self.state.form.set(&field, value)?;
            }
            ConsoleEvent::SymptomsEntered(symptoms) => {
                self.state.form.set(FIELD_SYMPTOMS, symptoms.clone())?;
                self.suggest_doctors(&symptoms)?;
            }
            ConsoleEvent::SubmitRequested => {
                self.submit_appointment()?;
            }
            ConsoleEvent::StatusChanged { patient_id, status } => {
                self.update_status(&patient_id, status)?;
            }
            ConsoleEvent::AssignBedRequested { patient_id } => {
                self.assign_bed(&patient_id)?;
            }
            ConsoleEvent::DeleteRequested { patient_id } => {
                self.delete_patient(&patient_id)?;
            }
        }
        Ok(())
    }
}
