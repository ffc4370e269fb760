use serde::{Deserialize, Serialize};

use super::enums::PatientStatus;

/// A patient as returned by the registry's list endpoint.
///
/// Only `id`, `name`, `phone`, `doctor` and `status` are rendered; the
/// remaining intake fields are carried so nothing the registry sends is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub phone: Option<String>,
    pub doctor: String,
    pub status: PatientStatus,
    #[serde(default)]
    pub age: Option<serde_json::Value>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub appointment_time: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
}

impl PatientRecord {
    /// Minimal record with only the displayed fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phone: Option<&str>,
        doctor: impl Into<String>,
        status: PatientStatus,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.map(str::to_string),
            doctor: doctor.into(),
            status,
            age: None,
            gender: None,
            address: None,
            disease: None,
            symptoms: None,
            appointment_time: None,
            registered_at: None,
        }
    }
}

/// Intake submission posted to `/add_patient`. Every value is sent as the
/// string the operator typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub disease: String,
    pub symptoms: String,
    pub address: String,
    pub phone: String,
    pub appointment_time: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
