//! Per-department table access configuration: which table backs a page,
//! what it displays, what it embeds and which columns free-text search hits.

use crate::domain::ports::Projection;

/// Table names the portal queries directly.
pub mod tables {
    pub const EMPLOYEES: &str = "employees";
    pub const PATIENTS: &str = "patients";
    pub const BILLING: &str = "billing_and_insurance";
    pub const MEDICATIONS: &str = "medications";
    pub const APPOINTMENTS: &str = "appointments";
    pub const PRESCRIPTIONS: &str = "prescriptions";
    pub const ANNOUNCEMENTS: &str = "announcements";
}

#[derive(Debug)]
pub struct ColumnSpec {
    pub header: &'static str,
    /// Row key; dotted for embedded columns (`patients.first_name`).
    pub key: &'static str,
}

#[derive(Debug)]
pub struct EmbedSpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug)]
pub struct TableConfig {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
    pub embeds: &'static [EmbedSpec],
    pub searchable: &'static [&'static str],
}

impl TableConfig {
    /// `*` plus the configured embeds.
    pub fn projection(&self) -> Projection {
        self.embeds
            .iter()
            .fold(Projection::all(), |projection, embed| {
                projection.embed(embed.table, embed.columns.iter().copied())
            })
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    pub fn data_keys(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.key).collect()
    }

    /// Sorting is only offered on displayed columns.
    pub fn is_sortable(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    /// Every distinct configured table (data explorer).
    pub fn all() -> [&'static TableConfig; 5] {
        [
            &PATIENTS_TABLE,
            &BILLING_TABLE,
            &APPOINTMENTS_TABLE,
            &MEDICATIONS_TABLE,
            &EMPLOYEES_TABLE,
        ]
    }

    pub fn by_table(table: &str) -> Option<&'static TableConfig> {
        Self::all().into_iter().find(|c| c.table == table)
    }
}

macro_rules! columns {
    ($($header:literal => $key:literal),* $(,)?) => {
        &[$(ColumnSpec { header: $header, key: $key }),*]
    };
}

pub static PATIENTS_TABLE: TableConfig = TableConfig {
    table: tables::PATIENTS,
    columns: columns![
        "Patient ID" => "patient_id",
        "First Name" => "first_name",
        "Last Name" => "last_name",
        "Birthday" => "birthday",
        "Age" => "age",
        "Gender" => "gender",
        "Phone" => "phone_number",
        "Address" => "address",
        "Emergency Contact" => "emergency_contact_name",
        "Emergency Phone" => "emergency_contact_number",
    ],
    embeds: &[],
    searchable: &["first_name", "last_name", "phone_number", "address"],
};

pub static BILLING_TABLE: TableConfig = TableConfig {
    table: tables::BILLING,
    columns: columns![
        "Billing #" => "billing_number",
        "Patient Name" => "patient_name",
        "Patient ID" => "patient_id",
        "Admission" => "admission_date",
        "Discharge" => "discharge_date",
        "Total Charges" => "total_charges",
        "Covered" => "amount_covered_by_insurance",
        "Paid" => "amount_paid",
        "Balance" => "running_balance",
        "Status" => "payment_status",
        "Provider" => "insurance_provider",
        "Policy #" => "policy_number",
        "Service" => "service_description",
        "Address" => "address",
        "DOB" => "date_of_birth",
        "Email" => "email",
        "Gender" => "gender",
        "Phone" => "phone_number",
    ],
    embeds: &[],
    searchable: &[
        "billing_number",
        "patient_name",
        "insurance_provider",
        "policy_number",
        "payment_status",
    ],
};

pub static APPOINTMENTS_TABLE: TableConfig = TableConfig {
    table: tables::APPOINTMENTS,
    columns: columns![
        "Appt ID" => "appt_id",
        "Patient First Name" => "patients.first_name",
        "Patient Last Name" => "patients.last_name",
        "Employee" => "employees.full_name",
        "Date & Time" => "appt_datetime",
        "Type" => "appt_type",
        "Status" => "status",
        "Room" => "room",
        "Check-in" => "check_in_time",
        "Complaint" => "chief_complaint",
        "Patient ID" => "patient_id",
        "Employee ID" => "employee_id",
    ],
    embeds: &[
        EmbedSpec {
            table: tables::PATIENTS,
            columns: &["first_name", "last_name"],
        },
        EmbedSpec {
            table: tables::EMPLOYEES,
            columns: &["full_name"],
        },
    ],
    searchable: &[
        "patients.first_name",
        "patients.last_name",
        "employees.full_name",
        "appt_type",
        "status",
    ],
};

pub static MEDICATIONS_TABLE: TableConfig = TableConfig {
    table: tables::MEDICATIONS,
    columns: columns![
        "ID" => "medication_id",
        "Generic Name" => "generic_name",
        "Description" => "description",
        "Formulation" => "formulation",
        "Dosage" => "dosage",
        "Manufacturer" => "manufacturer",
        "In Stock" => "quantity_stock",
        "Price/Unit" => "price_per_unit",
    ],
    embeds: &[],
    searchable: &["generic_name", "manufacturer", "formulation"],
};

pub static EMPLOYEES_TABLE: TableConfig = TableConfig {
    table: tables::EMPLOYEES,
    columns: columns![
        "ID" => "employee_id",
        "Full Name" => "full_name",
        "Job Title" => "job_title",
        "Department" => "department_name",
        "Location" => "department_location",
        "Status" => "status",
        "Hire Date" => "hire_date",
        "DOB" => "date_of_birth",
        "Salary" => "salary",
        "Email" => "email",
        "Phone" => "phone_number",
        "Street" => "address_street",
        "City" => "address_city",
        "State" => "address_state",
        "ZIP" => "address_zip_code",
        "Manager ID" => "manager_id",
        "Manager Activity" => "manager_activity",
    ],
    embeds: &[],
    searchable: &["full_name", "job_title", "department_name", "status", "email"],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Columns;

    #[test]
    fn test_appointments_projection_embeds_relations() {
        let projection = APPOINTMENTS_TABLE.projection();
        assert_eq!(projection.columns, Columns::All);
        let embedded: Vec<&str> = projection.embeds.iter().map(|e| e.table.as_str()).collect();
        assert_eq!(embedded, vec!["patients", "employees"]);
    }

    #[test]
    fn test_headers_and_keys_line_up() {
        for config in TableConfig::all() {
            assert_eq!(config.headers().len(), config.data_keys().len());
            assert!(!config.searchable.is_empty());
        }
    }

    #[test]
    fn test_is_sortable_only_for_displayed_columns() {
        assert!(APPOINTMENTS_TABLE.is_sortable("patients.last_name"));
        assert!(!APPOINTMENTS_TABLE.is_sortable("salary"));
    }

    #[test]
    fn test_by_table() {
        assert!(TableConfig::by_table("medications").is_some());
        assert!(TableConfig::by_table("prescriptions").is_none());
    }
}
