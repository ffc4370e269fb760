use super::enums::PatientStatus;

/// The four filter inputs above the patient table.
///
/// Empty text and `None` are wildcards for their dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFilter {
    /// Case-insensitive substring of the patient id.
    pub id_query: String,
    /// Case-insensitive substring of the phone number.
    pub phone_query: String,
    /// Exact doctor name, as offered by the doctor dropdown.
    pub doctor: Option<String>,
    /// Exact status.
    pub status: Option<PatientStatus>,
}

impl PatientFilter {
    /// True when no dimension constrains the list.
    pub fn is_empty(&self) -> bool {
        self.id_query.is_empty()
            && self.phone_query.is_empty()
            && self.doctor.is_none()
            && self.status.is_none()
    }
}
