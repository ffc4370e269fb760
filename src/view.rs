//! View model for the patient console.
//!
//! These types are what a front end draws: the patient table, the doctor
//! filter dropdown and the suggestion list. Interactive pieces (the status
//! selector and bed button on each row, dropdown options) produce
//! [`ConsoleEvent`]s rather than holding callbacks.

use std::fmt;

use crate::events::ConsoleEvent;
use crate::models::{DoctorSuggestion, PatientRecord, PatientStatus};

/// Shown in the phone column when a record has no phone.
pub const PHONE_PLACEHOLDER: &str = "—";

/// Label of the leading doctor dropdown option.
pub const ALL_DOCTORS_LABEL: &str = "All Doctors";

pub const ASSIGN_BED_LABEL: &str = "Assign Bed";

// ─── Patient table ────────────────────────────────────────────────────────────

/// Per-row status selector, pre-selected to the record's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSelector {
    pub patient_id: String,
    pub selected: PatientStatus,
}

impl StatusSelector {
    pub fn options(&self) -> &'static [PatientStatus] {
        PatientStatus::ALL
    }

    /// The event fired when the operator picks `status`.
    pub fn choose(&self, status: PatientStatus) -> ConsoleEvent {
        ConsoleEvent::StatusChanged {
            patient_id: self.patient_id.clone(),
            status,
        }
    }
}

/// Per-row bed assignment button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedButton {
    pub patient_id: String,
}

impl BedButton {
    pub fn label(&self) -> &'static str {
        ASSIGN_BED_LABEL
    }

    pub fn press(&self) -> ConsoleEvent {
        ConsoleEvent::AssignBedRequested {
            patient_id: self.patient_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub name: String,
    /// Phone number, or [`PHONE_PLACEHOLDER`].
    pub phone: String,
    pub doctor: String,
    pub status: StatusSelector,
    pub bed: BedButton,
}

impl TableRow {
    fn from_record(record: &PatientRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            phone: record
                .phone
                .clone()
                .unwrap_or_else(|| PHONE_PLACEHOLDER.to_string()),
            doctor: record.doctor.clone(),
            status: StatusSelector {
                patient_id: record.id.clone(),
                selected: record.status,
            },
            bed: BedButton {
                patient_id: record.id.clone(),
            },
        }
    }
}

/// Rendered table body. Row order is input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientTable {
    pub rows: Vec<TableRow>,
}

impl PatientTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, patient_id: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == patient_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Build a fresh table body from already-filtered records.
pub fn render_table<'a>(records: impl IntoIterator<Item = &'a PatientRecord>) -> PatientTable {
    PatientTable {
        rows: records.into_iter().map(TableRow::from_record).collect(),
    }
}

const HEADERS: [&str; 6] = ["ID", "Name", "Phone", "Doctor", "Status", "Action"];

impl fmt::Display for PatientTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<[&str; 6]> = self
            .rows
            .iter()
            .map(|r| {
                [
                    r.id.as_str(),
                    r.name.as_str(),
                    r.phone.as_str(),
                    r.doctor.as_str(),
                    r.status.selected.as_str(),
                    r.bed.label(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(f, &HEADERS, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
        write_row(f, &rule, &widths)?;
        for row in &cells {
            write_row(f, row, &widths)?;
        }
        if cells.is_empty() {
            writeln!(f, "(no patients)")?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    writeln!(f, "{}", line.join("  ").trim_end())
}

// ─── Doctor filter dropdown ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    /// Empty for the "All Doctors" sentinel.
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDropdown {
    pub options: Vec<DropdownOption>,
}

impl Default for DoctorDropdown {
    fn default() -> Self {
        Self::from_doctors(Vec::new())
    }
}

impl DoctorDropdown {
    /// "All Doctors" followed by one option per doctor, in the given order.
    pub fn from_doctors(doctors: Vec<String>) -> Self {
        let mut options = Vec::with_capacity(doctors.len() + 1);
        options.push(DropdownOption {
            value: String::new(),
            label: ALL_DOCTORS_LABEL.to_string(),
        });
        options.extend(doctors.into_iter().map(|doctor| DropdownOption {
            label: doctor.clone(),
            value: doctor,
        }));
        Self { options }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn contains(&self, doctor: &str) -> bool {
        !doctor.is_empty() && self.options.iter().any(|o| o.value == doctor)
    }

    /// Selection event for an option value; `None` if no such option.
    pub fn choose(&self, value: &str) -> Option<ConsoleEvent> {
        if value.is_empty() {
            return Some(ConsoleEvent::DoctorSelected(None));
        }
        self.contains(value)
            .then(|| ConsoleEvent::DoctorSelected(Some(value.to_string())))
    }
}

// ─── Doctor suggestions ───────────────────────────────────────────────────────

/// Lines shown under the symptoms box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    pub items: Vec<String>,
}

impl SuggestionList {
    /// Replace the whole list with `suggestions`.
    pub fn replace(&mut self, suggestions: &[DoctorSuggestion]) {
        self.items.clear();
        self.items
            .extend(suggestions.iter().map(DoctorSuggestion::display_line));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
