use std::fmt;

use serde::{Deserialize, Serialize};

use super::table::{
    TableConfig, APPOINTMENTS_TABLE, BILLING_TABLE, EMPLOYEES_TABLE, MEDICATIONS_TABLE,
    PATIENTS_TABLE,
};

/// The five organizational units that gate page access and table scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Patient Records")]
    PatientRecords,
    #[serde(rename = "Billing and Insurance")]
    Billing,
    #[serde(rename = "Appointments and Scheduling")]
    Appointments,
    #[serde(rename = "Pharmacy and Inventory")]
    Pharmacy,
    #[serde(rename = "Human Resources")]
    HumanResources,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::PatientRecords,
        Department::Billing,
        Department::Appointments,
        Department::Pharmacy,
        Department::HumanResources,
    ];

    /// Canonical label, also the value stored in `employees.department_name`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PatientRecords => "Patient Records",
            Self::Billing => "Billing and Insurance",
            Self::Appointments => "Appointments and Scheduling",
            Self::Pharmacy => "Pharmacy and Inventory",
            Self::HumanResources => "Human Resources",
        }
    }

    /// URL path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::PatientRecords => "patient-records",
            Self::Billing => "billing",
            Self::Appointments => "appointments",
            Self::Pharmacy => "pharmacy",
            Self::HumanResources => "human-resources",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Case-insensitive, whitespace-trimmed label match.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.label().to_lowercase() == wanted)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::PatientRecords => "Manage and access comprehensive patient medical histories, records, and documents securely.",
            Self::Billing => "Handle all billing inquiries, insurance claims, and payment processing with our integrated system.",
            Self::Appointments => "Schedule, reschedule, and manage all patient appointments and provider availability.",
            Self::Pharmacy => "Oversee medication dispensing, track inventory levels, and manage pharmacy operations.",
            Self::HumanResources => "Access employee information, manage payroll, and handle all human resources-related tasks.",
        }
    }

    /// Icon key understood by the front end.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::PatientRecords => "patient",
            Self::Billing => "billing",
            Self::Appointments => "appointment",
            Self::Pharmacy => "pharmacy",
            Self::HumanResources => "hr",
        }
    }

    pub fn table_config(&self) -> &'static TableConfig {
        match self {
            Self::PatientRecords => &PATIENTS_TABLE,
            Self::Billing => &BILLING_TABLE,
            Self::Appointments => &APPOINTMENTS_TABLE,
            Self::Pharmacy => &MEDICATIONS_TABLE,
            Self::HumanResources => &EMPLOYEES_TABLE,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip_for_every_department() {
        for dept in Department::ALL {
            assert_eq!(Department::from_slug(dept.slug()), Some(dept));
        }
        assert_eq!(Department::from_slug("radiology"), None);
    }

    #[test]
    fn test_from_label_is_case_and_whitespace_insensitive() {
        assert_eq!(
            Department::from_label("  pharmacy AND inventory "),
            Some(Department::Pharmacy)
        );
        assert_eq!(Department::from_label("Pharmacy"), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Department::HumanResources).unwrap();
        assert_eq!(json, "\"Human Resources\"");
    }

    #[test]
    fn test_each_department_has_its_own_table() {
        let mut tables: Vec<&str> = Department::ALL
            .iter()
            .map(|d| d.table_config().table)
            .collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 5);
    }
}
