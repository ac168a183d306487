//! Pure rollups over already-fetched analytics inputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::records::{AnalyticsInputs, AppointmentRecord, EmployeeRecord};
use super::records::{BillingRecord, MedicationRecord, PrescriptionRecord};

pub const TOP_PROVIDERS: usize = 10;
pub const TOP_MEDICATIONS: usize = 5;
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepartmentPerformance {
    pub department: String,
    pub staff: u64,
    pub appts: u64,
    pub unique_patients: u64,
    /// Attributed current-month revenue, rounded to whole units.
    pub revenue: i64,
    /// Revenue per staff member, rounded; 0 for a department without staff.
    pub efficiency: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub visit_trend: Vec<NamedCount>,
    pub top_providers: Vec<NamedCount>,
    pub top_medications: Vec<NamedCount>,
    pub department_matrix: Vec<DepartmentPerformance>,
}

/// Count occurrences, keep the `limit` largest. Ties keep first-seen order.
fn rank<I>(names: I, limit: usize) -> Vec<NamedCount>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<NamedCount> = Vec::new();
    for name in names {
        match index.get(&name) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(name.clone(), counts.len());
                counts.push(NamedCount { name, count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Appointments per calendar month, oldest first, labelled like "Jan 2024".
pub fn visit_trend(appointments: &[AppointmentRecord]) -> Vec<NamedCount> {
    let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for at in appointments.iter().filter_map(|a| a.appt_datetime) {
        *buckets.entry((at.year(), at.month())).or_default() += 1;
    }
    buckets
        .into_iter()
        .filter_map(|((year, month), count)| {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(NamedCount {
                name: first.format("%b %Y").to_string(),
                count,
            })
        })
        .collect()
}

pub fn top_providers(appointments: &[AppointmentRecord]) -> Vec<NamedCount> {
    rank(
        appointments.iter().map(|a| match &a.employee_name {
            Some(name) => name.clone(),
            None => format!("ID: {}", display_id(a.employee_id)),
        }),
        TOP_PROVIDERS,
    )
}

pub fn top_medications(
    prescriptions: &[PrescriptionRecord],
    medications: &[MedicationRecord],
) -> Vec<NamedCount> {
    let names: HashMap<i64, &str> = medications
        .iter()
        .filter_map(|m| Some((m.medication_id?, m.generic_name.as_deref()?)))
        .collect();
    rank(
        prescriptions.iter().map(|rx| {
            match rx.medication_id.and_then(|id| names.get(&id)) {
                Some(name) => name.to_string(),
                None => format!("Unknown Med (ID: {})", display_id(rx.medication_id)),
            }
        }),
        TOP_MEDICATIONS,
    )
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "unknown".to_string(), |id| id.to_string())
}

/// Trimmed department name; null or blank becomes [`UNASSIGNED`].
pub fn normalize_department(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => UNASSIGNED.to_string(),
    }
}

#[derive(Default)]
struct DepartmentTally {
    staff: u64,
    appts: u64,
    patients: HashSet<i64>,
    revenue: f64,
}

/// Current-month performance per department.
///
/// Each patient's month bill is split evenly over that patient's visits this
/// month; each visit credits its share to the department of the employee who
/// saw the patient.
pub fn department_matrix(
    employees: &[EmployeeRecord],
    appointments: &[AppointmentRecord],
    billing: &[BillingRecord],
    month_start: DateTime<Utc>,
) -> Vec<DepartmentPerformance> {
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, DepartmentTally> = HashMap::new();
    let mut employee_department: HashMap<i64, String> = HashMap::new();

    for employee in employees {
        let department = normalize_department(employee.department_name.as_deref());
        if !tallies.contains_key(&department) {
            order.push(department.clone());
        }
        tallies.entry(department.clone()).or_default().staff += 1;
        if let Some(id) = employee.employee_id {
            employee_department.insert(id, department);
        }
    }

    let mut patient_spend: HashMap<i64, f64> = HashMap::new();
    for bill in billing {
        if let Some(patient) = bill.patient_id {
            *patient_spend.entry(patient).or_default() += bill.total_charges;
        }
    }

    let monthly: Vec<&AppointmentRecord> = appointments
        .iter()
        .filter(|a| a.appt_datetime.is_some_and(|at| at >= month_start))
        .collect();

    let mut patient_visits: HashMap<i64, u64> = HashMap::new();
    for appt in &monthly {
        if let Some(patient) = appt.patient_id {
            *patient_visits.entry(patient).or_default() += 1;
        }
    }

    for appt in &monthly {
        let Some(tally) = appt
            .employee_id
            .and_then(|id| employee_department.get(&id))
            .and_then(|dept| tallies.get_mut(dept))
        else {
            continue;
        };
        tally.appts += 1;
        if let Some(patient) = appt.patient_id {
            tally.patients.insert(patient);
            let spend = patient_spend.get(&patient).copied().unwrap_or(0.0);
            let visits = patient_visits.get(&patient).copied().unwrap_or(1).max(1);
            tally.revenue += spend / visits as f64;
        }
    }

    let mut matrix: Vec<DepartmentPerformance> = order
        .into_iter()
        .filter_map(|department| {
            let tally = tallies.remove(&department)?;
            let efficiency = if tally.staff > 0 {
                (tally.revenue / tally.staff as f64).round() as i64
            } else {
                0
            };
            Some(DepartmentPerformance {
                department,
                staff: tally.staff,
                appts: tally.appts,
                unique_patients: tally.patients.len() as u64,
                revenue: tally.revenue.round() as i64,
                efficiency,
            })
        })
        .collect();
    matrix.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    matrix
}

pub fn build_report(
    inputs: &AnalyticsInputs,
    month_start: DateTime<Utc>,
    generated_at: DateTime<Utc>,
) -> AnalyticsReport {
    AnalyticsReport {
        generated_at,
        month_start,
        visit_trend: visit_trend(&inputs.appointments),
        top_providers: top_providers(&inputs.appointments),
        top_medications: top_medications(&inputs.prescriptions, &inputs.medications),
        department_matrix: department_matrix(
            &inputs.employees,
            &inputs.appointments,
            &inputs.billing,
            month_start,
        ),
    }
}
