//! Lenient row readers for the analytics inputs.
//!
//! Rows arrive as loose JSON; a field that is missing or of the wrong type
//! becomes `None` (or zero for money) rather than failing the whole report.

use chrono::{DateTime, Utc};

use crate::domain::ports::{lookup, value_as_f64, value_as_i64, Row};
use crate::shared::parse_timestamp;

fn int(row: &Row, path: &str) -> Option<i64> {
    lookup(row, path).and_then(value_as_i64)
}

fn text(row: &Row, path: &str) -> Option<String> {
    lookup(row, path)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn timestamp(row: &Row, path: &str) -> Option<DateTime<Utc>> {
    lookup(row, path)
        .and_then(|v| v.as_str())
        .and_then(parse_timestamp)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRecord {
    pub patient_id: Option<i64>,
    pub employee_id: Option<i64>,
    /// `None` when absent or unparsable.
    pub appt_datetime: Option<DateTime<Utc>>,
    /// From the embedded `employees(full_name)` relation.
    pub employee_name: Option<String>,
}

impl AppointmentRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            patient_id: int(row, "patient_id"),
            employee_id: int(row, "employee_id"),
            appt_datetime: timestamp(row, "appt_datetime"),
            employee_name: text(row, "employees.full_name").filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub employee_id: Option<i64>,
    pub department_name: Option<String>,
}

impl EmployeeRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            employee_id: int(row, "employee_id"),
            department_name: text(row, "department_name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    pub patient_id: Option<i64>,
    pub total_charges: f64,
}

impl BillingRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            patient_id: int(row, "patient_id"),
            total_charges: lookup(row, "total_charges")
                .and_then(value_as_f64)
                .unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionRecord {
    pub medication_id: Option<i64>,
}

impl PrescriptionRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            medication_id: int(row, "medication_id"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicationRecord {
    pub medication_id: Option<i64>,
    pub generic_name: Option<String>,
}

impl MedicationRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            medication_id: int(row, "medication_id"),
            generic_name: text(row, "generic_name").filter(|n| !n.is_empty()),
        }
    }
}

/// The five fetched tables a report is computed from.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsInputs {
    /// Current-month billing rows.
    pub billing: Vec<BillingRecord>,
    /// All appointments, any date.
    pub appointments: Vec<AppointmentRecord>,
    pub employees: Vec<EmployeeRecord>,
    /// Current-month prescriptions.
    pub prescriptions: Vec<PrescriptionRecord>,
    pub medications: Vec<MedicationRecord>,
}

impl AnalyticsInputs {
    pub fn from_rows(
        billing: &[Row],
        appointments: &[Row],
        employees: &[Row],
        prescriptions: &[Row],
        medications: &[Row],
    ) -> Self {
        Self {
            billing: billing.iter().map(BillingRecord::from_row).collect(),
            appointments: appointments.iter().map(AppointmentRecord::from_row).collect(),
            employees: employees.iter().map(EmployeeRecord::from_row).collect(),
            prescriptions: prescriptions.iter().map(PrescriptionRecord::from_row).collect(),
            medications: medications.iter().map(MedicationRecord::from_row).collect(),
        }
    }
}
