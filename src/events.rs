//! Operator interactions, as values.
//!
//! View controls never call into the console directly. Each control turns
//! an interaction into a [`ConsoleEvent`], and `PatientConsole::dispatch`
//! is the single place that binds events to operations.

use crate::models::PatientStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// The console became interactive; triggers the initial load.
    Ready,
    /// Any keystroke in the id search box.
    IdQueryChanged(String),
    /// Any keystroke in the phone search box.
    PhoneQueryChanged(String),
    /// Doctor dropdown selection; `None` is "All Doctors".
    DoctorSelected(Option<String>),
    /// Status filter selection; `None` is "All".
    StatusFilterSelected(Option<PatientStatus>),
    /// Reset all four filter inputs.
    FiltersCleared,
    /// An intake form field was edited.
    FieldEdited { field: String, value: String },
    /// Symptoms were entered; asks the suggestion service for doctors.
    SymptomsEntered(String),
    /// The intake form's submit button.
    SubmitRequested,
    /// A row's status selector changed.
    StatusChanged {
        patient_id: String,
        status: PatientStatus,
    },
    /// A row's "Assign Bed" button.
    AssignBedRequested { patient_id: String },
    /// Remove a patient from the registry.
    DeleteRequested { patient_id: String },
    /// Re-fetch the patient list.
    ReloadRequested,
}

impl ConsoleEvent {
    /// Events that change server state and are followed by a reload.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::StatusChanged { .. }
                | Self::AssignBedRequested { .. }
                | Self::DeleteRequested { .. }
        )
    }

    /// Events that only re-run the filter over the cache.
    pub fn is_filter_change(&self) -> bool {
        matches!(
            self,
            Self::IdQueryChanged(_)
                | Self::PhoneQueryChanged(_)
                | Self::DoctorSelected(_)
                | Self::StatusFilterSelected(_)
                | Self::FiltersCleared
        )
    }
}
