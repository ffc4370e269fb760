//! Patient intake form and its validation rules.
//!
//! The form is a plain value model: the front end writes operator input
//! into fields by id and reads back each field's highlight after
//! validation. Two passes run before anything is posted:
//!
//! 1. [`validate_form`] checks every required field (non-blank, numeric
//!    fields parse and are not negative, the appointment time is a
//!    `YYYY-MM-DDTHH:MM` datetime) and highlights exactly the failures.
//! 2. [`check_age_range`] enforces `0 <= age <= 150`.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::NewPatient;
use crate::notify::Notifier;

pub const FIELD_NAME: &str = "name";
pub const FIELD_AGE: &str = "age";
pub const FIELD_GENDER: &str = "gender";
pub const FIELD_DISEASE: &str = "disease";
pub const FIELD_SYMPTOMS: &str = "symptoms";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_APPOINTMENT_TIME: &str = "appointment_time";

pub const AGE_MIN: f64 = 0.0;
pub const AGE_MAX: f64 = 150.0;

/// Format of an HTML `datetime-local` value, which the registry parses.
pub const APPOINTMENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub const AGE_RANGE_MESSAGE: &str = "Please enter a valid age between 0 and 150";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Select,
    DateTime,
}

/// Highlight state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMark {
    #[default]
    Neutral,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub mark: FieldMark,
}

impl FormField {
    fn required(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            required: true,
            value: String::new(),
            mark: FieldMark::Neutral,
        }
    }
}

/// The appointment form at the front desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeForm {
    fields: Vec<FormField>,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeForm {
    pub fn new() -> Self {
        Self {
            fields: vec![
                FormField::required(FIELD_NAME, "Name", FieldKind::Text),
                FormField::required(FIELD_AGE, "Age", FieldKind::Number),
                FormField::required(FIELD_GENDER, "Gender", FieldKind::Select),
                FormField::required(FIELD_DISEASE, "Disease", FieldKind::Text),
                FormField::required(FIELD_SYMPTOMS, "Symptoms", FieldKind::Text),
                FormField::required(FIELD_ADDRESS, "Address", FieldKind::Text),
                FormField::required(FIELD_PHONE, "Phone", FieldKind::Text),
                FormField::required(
                    FIELD_APPOINTMENT_TIME,
                    "Appointment time",
                    FieldKind::DateTime,
                ),
            ],
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.field(id).map(|f| f.value.as_str())
    }

    /// Store operator input. Highlights are left alone until the next
    /// validation pass.
    pub fn set(&mut self, id: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))?;
        field.value = value.into();
        Ok(())
    }

    /// Ids of the currently highlighted fields, in form order.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.mark == FieldMark::Invalid)
            .map(|f| f.id)
            .collect()
    }

    /// Clear every value and highlight.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.mark = FieldMark::Neutral;
        }
    }

    /// The registry payload, with values exactly as typed.
    pub fn submission(&self) -> NewPatient {
        let value = |id: &str| self.value(id).unwrap_or_default().to_string();
        NewPatient {
            name: value(FIELD_NAME),
            age: value(FIELD_AGE),
            gender: value(FIELD_GENDER),
            disease: value(FIELD_DISEASE),
            symptoms: value(FIELD_SYMPTOMS),
            address: value(FIELD_ADDRESS),
            phone: value(FIELD_PHONE),
            appointment_time: value(FIELD_APPOINTMENT_TIME),
        }
    }

    fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }
}

/// Check every required field and update highlights.
///
/// Every required field ends the pass either `Invalid` or `Neutral`, so
/// stale highlights from an earlier attempt never survive. Negative
/// numbers additionally raise a blocking warning. Returns whether all
/// constraints hold.
pub fn validate_form(form: &mut IntakeForm, notifier: &mut impl Notifier) -> bool {
    let mut valid = true;

    for field in form.fields.iter_mut().filter(|f| f.required) {
        let value = field.value.trim();
        let ok = if value.is_empty() {
            false
        } else {
            match field.kind {
                FieldKind::Number => match parse_number(value) {
                    Some(n) if n < 0.0 => {
                        notifier.alert(&format!("{} cannot be negative!", field.label));
                        false
                    }
                    Some(_) => true,
                    None => {
                        notifier.alert(&format!("{} must be a number", field.label));
                        false
                    }
                },
                FieldKind::DateTime => {
                    NaiveDateTime::parse_from_str(value, APPOINTMENT_TIME_FORMAT).is_ok()
                }
                FieldKind::Text | FieldKind::Select => true,
            }
        };

        field.mark = if ok {
            FieldMark::Neutral
        } else {
            FieldMark::Invalid
        };
        valid &= ok;
    }

    if !valid {
        tracing::debug!(invalid = ?form.invalid_fields(), "Intake form failed validation");
    }
    valid
}

/// Age must lie in `[0, 150]`. Runs after [`validate_form`].
pub fn check_age_range(form: &mut IntakeForm, notifier: &mut impl Notifier) -> bool {
    let in_range = form
        .value(FIELD_AGE)
        .and_then(|v| parse_number(v.trim()))
        .is_some_and(|age| (AGE_MIN..=AGE_MAX).contains(&age));

    if !in_range {
        if let Some(field) = form.field_mut(FIELD_AGE) {
            field.mark = FieldMark::Invalid;
        }
        notifier.alert(AGE_RANGE_MESSAGE);
    }
    in_range
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    fn filled_form() -> IntakeForm {
        let mut form = IntakeForm::new();
        for (id, value) in [
            (FIELD_NAME, "Asha Rao"),
            (FIELD_AGE, "34"),
            (FIELD_GENDER, "Female"),
            (FIELD_DISEASE, "Flu"),
            (FIELD_SYMPTOMS, "fever and cough"),
            (FIELD_ADDRESS, "12 MG Road"),
            (FIELD_PHONE, "9876543210"),
            (FIELD_APPOINTMENT_TIME, "2026-10-20T09:30"),
        ] {
            form.set(id, value).unwrap();
        }
        form
    }

    #[test]
    fn complete_form_is_valid() {
        let mut form = filled_form();
        let mut notifier = RecordingNotifier::new();
        assert!(validate_form(&mut form, &mut notifier));
        assert!(form.invalid_fields().is_empty());
        assert!(notifier.alerts().is_empty());
    }

    #[test]
    fn blank_fields_are_highlighted_exactly() {
        let mut form = filled_form();
        form.set(FIELD_NAME, "   ").unwrap();
        form.set(FIELD_ADDRESS, "").unwrap();
        let mut notifier = RecordingNotifier::new();

        assert!(!validate_form(&mut form, &mut notifier));
        assert_eq!(form.invalid_fields(), vec![FIELD_NAME, FIELD_ADDRESS]);
        assert!(notifier.alerts().is_empty());
    }

    #[test]
    fn negative_age_fails_with_warning() {
        let mut form = filled_form();
        form.set(FIELD_AGE, "-1").unwrap();
        let mut notifier = RecordingNotifier::new();

        assert!(!validate_form(&mut form, &mut notifier));
        assert_eq!(form.invalid_fields(), vec![FIELD_AGE]);
        assert_eq!(notifier.alerts(), ["Age cannot be negative!"]);
    }

    #[test]
    fn non_numeric_age_is_invalid() {
        let mut form = filled_form();
        form.set(FIELD_AGE, "thirty").unwrap();
        let mut notifier = RecordingNotifier::new();

        assert!(!validate_form(&mut form, &mut notifier));
        assert_eq!(form.invalid_fields(), vec![FIELD_AGE]);
        assert_eq!(notifier.last(), Some("Age must be a number"));

        form.set(FIELD_AGE, "NaN").unwrap();
        assert!(!validate_form(&mut form, &mut notifier));
    }

    #[test]
    fn malformed_appointment_time_is_invalid() {
        let mut form = filled_form();
        form.set(FIELD_APPOINTMENT_TIME, "20/10/2026 9am").unwrap();
        let mut notifier = RecordingNotifier::new();

        assert!(!validate_form(&mut form, &mut notifier));
        assert_eq!(form.invalid_fields(), vec![FIELD_APPOINTMENT_TIME]);
    }

    #[test]
    fn stale_highlights_are_cleared() {
        let mut form = filled_form();
        form.set(FIELD_PHONE, "").unwrap();
        let mut notifier = RecordingNotifier::new();
        assert!(!validate_form(&mut form, &mut notifier));
        assert_eq!(form.invalid_fields(), vec![FIELD_PHONE]);

        form.set(FIELD_PHONE, "555").unwrap();
        assert!(validate_form(&mut form, &mut notifier));
        assert!(form.invalid_fields().is_empty());
    }

    #[test]
    fn age_boundaries() {
        let mut notifier = RecordingNotifier::new();
        for (age, expected) in [("0", true), ("150", true), ("-1", false), ("151", false)] {
            let mut form = filled_form();
            form.set(FIELD_AGE, age).unwrap();
            let accepted = validate_form(&mut form, &mut notifier)
                && check_age_range(&mut form, &mut notifier);
            assert_eq!(accepted, expected, "age {age}");
        }
    }

    #[test]
    fn out_of_range_age_alerts_and_highlights() {
        let mut form = filled_form();
        form.set(FIELD_AGE, "200").unwrap();
        let mut notifier = RecordingNotifier::new();

        assert!(validate_form(&mut form, &mut notifier));
        assert!(!check_age_range(&mut form, &mut notifier));
        assert_eq!(notifier.alerts(), [AGE_RANGE_MESSAGE]);
        assert_eq!(form.invalid_fields(), vec![FIELD_AGE]);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let mut form = IntakeForm::new();
        assert_eq!(
            form.set("email", "a@b.c"),
            Err(FormError::UnknownField("email".into()))
        );
    }

    #[test]
    fn reset_clears_values_and_marks() {
        let mut form = filled_form();
        form.set(FIELD_NAME, "").unwrap();
        validate_form(&mut form, &mut RecordingNotifier::new());
        form.reset();
        assert!(form.fields().iter().all(|f| f.value.is_empty()));
        assert!(form.invalid_fields().is_empty());
    }

    #[test]
    fn submission_copies_values_verbatim() {
        let form = filled_form();
        let patient = form.submission();
        assert_eq!(patient.name, "Asha Rao");
        assert_eq!(patient.age, "34");
        assert_eq!(patient.appointment_time, "2026-10-20T09:30");
    }
}
