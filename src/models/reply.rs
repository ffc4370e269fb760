//! Registry reply shapes and JSON decoding.
//!
//! The registry answers mutations with either `{message, ...}` or
//! `{error}` and does not use structured error codes. Decoding folds that
//! into [`ServerReply`], a discriminated result keyed by HTTP status, so
//! callers never inspect loose `message`/`error` fields. Bodies that are not
//! JSON at all are transport-level problems and become [`RegistryError`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::RegistryError;

/// Longest server body kept verbatim in an error.
const MAX_ERROR_BODY: usize = 512;

/// Why the registry refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyErrorKind {
    /// The patient id is unknown (HTTP 404).
    NotFound,
    /// A business rule refused the request (other 4xx, or `{error}` on 2xx).
    Rejected,
    /// The registry failed while handling the request (5xx).
    ServerFailure,
}

impl ReplyErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            500..=599 => Self::ServerFailure,
            _ => Self::Rejected,
        }
    }
}

impl std::fmt::Display for ReplyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::Rejected => write!(f, "Rejected"),
            Self::ServerFailure => write!(f, "Server failure"),
        }
    }
}

/// Outcome of a registry call that the registry itself answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply<T> {
    Ok(T),
    Err { kind: ReplyErrorKind, detail: String },
}

impl<T> ServerReply<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Err { .. } => None,
        }
    }
}

/// Reply to add-patient, status update and delete: `{message, doctor?, id?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default, rename = "id")]
    pub patient_id: Option<String>,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            doctor: None,
            patient_id: None,
        }
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = Some(doctor.into());
        self
    }
}

/// Bed assignment reply: `{bed_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedAssignment {
    #[serde(deserialize_with = "string_or_number")]
    pub bed_number: String,
}

/// One entry from the doctor suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSuggestion {
    pub name: String,
    pub speciality: String,
}

impl DoctorSuggestion {
    /// `"<name> (<speciality>)"`, as listed under the symptoms box.
    pub fn display_line(&self) -> String {
        format!("{} ({})", self.name, self.speciality)
    }
}

/// Aggregate counts reported by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatistics {
    pub total_patients: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_doctor: BTreeMap<String, u64>,
}

/// Decode a mutation reply into a [`ServerReply`].
pub fn decode_reply<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<ServerReply<T>, RegistryError> {
    let value = parse_json(status, body)?;

    if let Some(detail) = value.get("error").map(error_text) {
        return Ok(ServerReply::Err {
            kind: reply_kind(status),
            detail,
        });
    }

    if !is_success(status) {
        let detail = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| truncate(body));
        return Ok(ServerReply::Err {
            kind: ReplyErrorKind::from_status(status),
            detail,
        });
    }

    serde_json::from_value(value)
        .map(ServerReply::Ok)
        .map_err(|e| RegistryError::ResponseParsing(e.to_string()))
}

/// Decode a read payload (patient list, suggestions, statistics).
///
/// Reads have no business outcome to report, so a refusal is an error.
pub fn decode_payload<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, RegistryError> {
    let value = parse_json(status, body)?;

    if let Some(detail) = value.get("error").map(error_text) {
        return Err(RegistryError::Rejected { status, detail });
    }
    if !is_success(status) {
        return Err(RegistryError::ServerError {
            status,
            body: truncate(body),
        });
    }

    serde_json::from_value(value).map_err(|e| RegistryError::ResponseParsing(e.to_string()))
}

fn parse_json(status: u16, body: &str) -> Result<Value, RegistryError> {
    serde_json::from_str(body).map_err(|e| {
        if is_success(status) {
            RegistryError::ResponseParsing(e.to_string())
        } else {
            RegistryError::ServerError {
                status,
                body: truncate(body),
            }
        }
    })
}

fn reply_kind(status: u16) -> ReplyErrorKind {
    if is_success(status) {
        ReplyErrorKind::Rejected
    } else {
        ReplyErrorKind::from_status(status)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected bed number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_patient_success_reply() {
        let reply: ServerReply<Confirmation> = decode_reply(
            200,
            r#"{"message":"✅ Patient added","id":"a1b2c3d4","doctor":"Dr. Sharma (General)"}"#,
        )
        .unwrap();
        let confirmation = reply.ok().unwrap();
        assert_eq!(confirmation.message, "✅ Patient added");
        assert_eq!(confirmation.doctor.as_deref(), Some("Dr. Sharma (General)"));
        assert_eq!(confirmation.patient_id.as_deref(), Some("a1b2c3d4"));
    }

    #[test]
    fn not_found_error_reply() {
        let reply: ServerReply<Confirmation> =
            decode_reply(404, r#"{"error":"Patient not found"}"#).unwrap();
        assert_eq!(
            reply,
            ServerReply::Err {
                kind: ReplyErrorKind::NotFound,
                detail: "Patient not found".into()
            }
        );
    }

    #[test]
    fn error_field_on_success_status_is_rejection() {
        let reply: ServerReply<BedAssignment> =
            decode_reply(200, r#"{"error":"No beds available"}"#).unwrap();
        assert!(matches!(
            reply,
            ServerReply::Err {
                kind: ReplyErrorKind::Rejected,
                ..
            }
        ));
    }

    #[test]
    fn server_failure_with_json_body() {
        let reply: ServerReply<Confirmation> =
            decode_reply(500, r#"{"error":"Failed to add patient: 'age'"}"#).unwrap();
        assert!(matches!(
            reply,
            ServerReply::Err {
                kind: ReplyErrorKind::ServerFailure,
                ref detail
            } if detail.contains("'age'")
        ));
    }

    #[test]
    fn non_json_failure_is_server_error() {
        let err = decode_reply::<Confirmation>(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, RegistryError::ServerError { status: 502, .. }));
    }

    #[test]
    fn non_json_success_is_parsing_error() {
        let err = decode_reply::<Confirmation>(200, "OK").unwrap_err();
        assert!(matches!(err, RegistryError::ResponseParsing(_)));
    }

    #[test]
    fn bed_number_accepts_number() {
        let reply: ServerReply<BedAssignment> = decode_reply(200, r#"{"bed_number":12}"#).unwrap();
        assert_eq!(reply.ok().unwrap().bed_number, "12");
        let reply: ServerReply<BedAssignment> =
            decode_reply(200, r#"{"bed_number":"B-7"}"#).unwrap();
        assert_eq!(reply.ok().unwrap().bed_number, "B-7");
    }

    #[test]
    fn payload_decodes_suggestions() {
        let list: Vec<DoctorSuggestion> = decode_payload(
            200,
            r#"[{"name":"Dr. Mehta (Chest)","speciality":"cough"}]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].display_line(), "Dr. Mehta (Chest) (cough)");
    }

    #[test]
    fn payload_error_object_is_rejected() {
        let err = decode_payload::<Vec<DoctorSuggestion>>(
            500,
            r#"{"error":"Failed to suggest doctor"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Rejected { status: 500, .. }));
    }

    #[test]
    fn statistics_decode() {
        let stats: RegistryStatistics = decode_payload(
            200,
            r#"{"total_patients":3,"by_status":{"Pending":2,"Admitted":1},"by_doctor":{"Dr X":3}}"#,
        )
        .unwrap();
        assert_eq!(stats.total_patients, 3);
        assert_eq!(stats.by_status["Pending"], 2);
        assert_eq!(stats.by_doctor["Dr X"], 3);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY + 100);
        match decode_payload::<Vec<DoctorSuggestion>>(503, &body).unwrap_err() {
            RegistryError::ServerError { body, .. } => {
                assert_eq!(body.chars().count(), MAX_ERROR_BODY + 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
