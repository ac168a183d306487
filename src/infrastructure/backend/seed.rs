//! Demo data generator.
//!
//! Inserts a coherent set of rows through any [`TableGateway`]: foreign keys
//! are taken from the rows the backend hands back, so it works against an
//! empty in-memory store and a real PostgREST project alike.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::SeedConfig;
use crate::domain::department::{tables, Department};
use crate::domain::ports::{value_as_i64, GatewayError, GatewayResult, Row, TableGateway};

const FIRST_NAMES: &[&str] = &[
    "Olivia", "Liam", "Emma", "Noah", "Amelia", "Oliver", "Sophia", "Elijah", "Mia", "James",
    "Harper", "Lucas", "Evelyn", "Mateo", "Aria", "Ethan", "Layla", "Henry", "Nora", "Samuel",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];
const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Riverside", "CA"),
    ("Franklin", "TN"),
    ("Greenville", "SC"),
    ("Madison", "WI"),
    ("Salem", "OR"),
];
const STREETS: &[&str] = &["Oak St", "Maple Ave", "Cedar Ln", "Pine Rd", "Elm Dr", "Lakeview Blvd"];
const JOB_TITLES: &[&str] = &[
    "Doctor",
    "Nurse",
    "Surgeon",
    "Administrator",
    "Pharmacist",
    "Lab Technician",
    "Radiologist",
    "HR Specialist",
    "Accountant",
];
const EMPLOYEE_STATUSES: &[&str] = &["Active", "On Leave", "Sabbatical"];
const MED_NAMES: &[&str] = &[
    "Amoxicillin", "Ibuprofen", "Metformin", "Lisinopril", "Atorvastatin", "Omeprazole",
    "Amlodipine", "Levothyroxine", "Albuterol", "Gabapentin", "Sertraline", "Losartan",
];
const MED_SALTS: &[&str] = &["HCL", "Sodium", "Potassium"];
const FORMULATIONS: &[&str] = &["Tablet", "Capsule", "Liquid", "Injection", "Cream", "Inhaler"];
const MANUFACTURERS: &[&str] = &["Northwind", "Contoso", "Fabrikam", "Globex", "Initech", "Umbrella"];
const APPT_TYPES: &[&str] = &["Check-up", "Emergency", "Surgery", "Follow-up", "Consultation"];
const FUTURE_STATUSES: &[&str] = &["Scheduled", "Scheduled", "Cancelled", "No Show"];
const PAYMENT_STATUSES: &[&str] = &["Paid", "Pending", "Overdue", "Insurance Processing"];
const INSURERS: &[&str] = &["Blue Cross", "Aetna", "UnitedHealth", "Cigna", "Medicare"];
const SERVICES: &[&str] = &["Cardiology", "Orthopedic", "Maternity", "Oncology", "General Care"];
const COMPLAINTS: &[&str] = &[
    "Persistent headache",
    "Chest discomfort",
    "Routine annual exam",
    "Post-operative review",
    "Shortness of breath",
    "Lower back pain",
];

/// Rows inserted per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub patients: usize,
    pub employees: usize,
    pub medications: usize,
    pub appointments: usize,
    pub billing: usize,
    pub prescriptions: usize,
    pub announcements: usize,
}

pub struct DemoSeeder<'a> {
    gateway: &'a dyn TableGateway,
    counts: SeedConfig,
    rng: StdRng,
    now: DateTime<Utc>,
}

fn pick<'s>(rng: &mut StdRng, items: &[&'s str]) -> &'s str {
    items.choose(rng).copied().unwrap_or_default()
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        _ => Row::new(),
    }
}

fn ids(rows: &[Row], key: &str) -> Vec<i64> {
    rows.iter()
        .filter_map(|r| r.get(key).and_then(value_as_i64))
        .collect()
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

impl<'a> DemoSeeder<'a> {
    pub fn new(gateway: &'a dyn TableGateway, counts: SeedConfig, rng: StdRng, now: DateTime<Utc>) -> Self {
        Self {
            gateway,
            counts,
            rng,
            now,
        }
    }

    fn phone(&mut self) -> String {
        format!(
            "({}) {}-{:04}",
            self.rng.gen_range(200..999),
            self.rng.gen_range(200..999),
            self.rng.gen_range(0..10_000)
        )
    }

    fn person(&mut self) -> (&'static str, &'static str) {
        (pick(&mut self.rng, FIRST_NAMES), pick(&mut self.rng, LAST_NAMES))
    }

    fn address(&mut self) -> String {
        let (city, state) = CITIES.choose(&mut self.rng).copied().unwrap_or(("Springfield", "IL"));
        format!(
            "{} {}, {}, {}",
            self.rng.gen_range(10..9999),
            pick(&mut self.rng, STREETS),
            city,
            state
        )
    }

    fn birthdate(&mut self, min_age: i64, max_age: i64) -> (String, i64) {
        let days = self.rng.gen_range(min_age * 365..max_age * 365);
        let born = self.now - Duration::days(days);
        (date(born), days / 365)
    }

    /// Seed every table in dependency order.
    pub async fn run(mut self) -> GatewayResult<SeedReport> {
        let mut report = SeedReport::default();

        let patients = self.seed_patients().await?;
        report.patients = patients.len();
        info!(count = report.patients, "seeded patients");

        let employees = self.seed_employees().await?;
        report.employees = employees.len();
        info!(count = report.employees, "seeded employees");

        let medications = self.seed_medications().await?;
        report.medications = medications.len();
        info!(count = report.medications, "seeded medications");

        let patient_ids = ids(&patients, "patient_id");
        let employee_ids = ids(&employees, "employee_id");
        let medication_ids = ids(&medications, "medication_id");
        if patient_ids.is_empty() || employee_ids.is_empty() || medication_ids.is_empty() {
            return Err(GatewayError::Decode(
                "backend returned no ids for seeded rows".to_string(),
            ));
        }

        report.appointments = self.seed_appointments(&patient_ids, &employee_ids).await?;
        info!(count = report.appointments, "seeded appointments");

        report.billing = self.seed_billing(&patients).await?;
        info!(count = report.billing, "seeded billing records");

        report.prescriptions = match self
            .seed_prescriptions(&patient_ids, &employee_ids, &medication_ids)
            .await
        {
            Ok(n) => n,
            Err(e) if e.is_relation_missing() => {
                warn!("prescriptions table not found, skipping");
                0
            }
            Err(e) => return Err(e),
        };
        info!(count = report.prescriptions, "seeded prescriptions");

        report.announcements = self.seed_announcements().await?;
        Ok(report)
    }

    async fn seed_patients(&mut self) -> GatewayResult<Vec<Row>> {
        let mut rows = Vec::new();
        for _ in 0..self.counts.patients {
            let (first, last) = self.person();
            let (birthday, age) = self.birthdate(1, 90);
            let (contact_first, contact_last) = self.person();
            rows.push(object(json!({
                "first_name": first,
                "last_name": last,
                "birthday": birthday,
                "age": age,
                "gender": if self.rng.gen_bool(0.5) { "female" } else { "male" },
                "phone_number": self.phone(),
                "address": self.address(),
                "emergency_contact_name": format!("{contact_first} {contact_last}"),
                "emergency_contact_number": self.phone(),
            })));
        }
        self.gateway.insert(tables::PATIENTS, rows).await
    }

    async fn seed_employees(&mut self) -> GatewayResult<Vec<Row>> {
        let mut departments: Vec<&str> = Department::ALL.iter().map(|d| d.label()).collect();
        departments.push("Administration");

        // One predictable login per department, then random staff.
        let mut fixed: Vec<(String, String, &str, &str)> = vec![(
            "Avery Admin".into(),
            "admin@cloudink.hospital".into(),
            "Administration",
            "Chief Executive Officer",
        )];
        for dept in Department::ALL {
            fixed.push((
                format!("{} Lead", dept.label()),
                format!("{}@cloudink.hospital", dept.slug()),
                dept.label(),
                "Department Lead",
            ));
        }

        let mut rows = Vec::new();
        let total = self.counts.employees as usize;
        for i in 0..total.max(fixed.len()) {
            let (full_name, email, department, job_title) = match fixed.get(i) {
                Some((name, email, dept, title)) => (name.clone(), email.clone(), *dept, *title),
                None => {
                    let (first, last) = self.person();
                    (
                        format!("{first} {last}"),
                        format!("{}.{}{}@cloudink.hospital", first.to_lowercase(), last.to_lowercase(), i),
                        pick(&mut self.rng, &departments),
                        pick(&mut self.rng, JOB_TITLES),
                    )
                }
            };
            let (city, state) = CITIES.choose(&mut self.rng).copied().unwrap_or(("Salem", "OR"));
            let (date_of_birth, _) = self.birthdate(22, 65);
            let hired = self.now - Duration::days(self.rng.gen_range(30..3650));
            rows.push(object(json!({
                "full_name": full_name,
                "job_title": job_title,
                "department_name": department,
                "department_location": format!("Building {}", (b'A' + self.rng.gen_range(0..6u8)) as char),
                "status": if i < fixed.len() { "Active" } else { pick(&mut self.rng, EMPLOYEE_STATUSES) },
                "hire_date": date(hired),
                "date_of_birth": date_of_birth,
                "salary": self.rng.gen_range(40_000..250_000),
                "email": email,
                "phone_number": self.phone(),
                "address_street": format!("{} {}", self.rng.gen_range(10..9999), pick(&mut self.rng, STREETS)),
                "address_city": city,
                "address_state": state,
                "address_zip_code": format!("{:05}", self.rng.gen_range(10_000..99_999)),
                "manager_id": Value::Null,
                "manager_activity": "Quarterly staffing review",
            })));
        }
        self.gateway.insert(tables::EMPLOYEES, rows).await
    }

    async fn seed_medications(&mut self) -> GatewayResult<Vec<Row>> {
        let mut rows = Vec::new();
        for _ in 0..self.counts.medications {
            let name = format!("{} {}", pick(&mut self.rng, MED_NAMES), pick(&mut self.rng, MED_SALTS));
            let price = self.rng.gen_range(100..50_000) as f64 / 100.0;
            rows.push(object(json!({
                "generic_name": name,
                "description": format!("{name} for general clinical use"),
                "formulation": pick(&mut self.rng, FORMULATIONS),
                "dosage": format!("{}mg", self.rng.gen_range(5..500)),
                "manufacturer": format!("{} Pharma", pick(&mut self.rng, MANUFACTURERS)),
                "quantity_stock": self.rng.gen_range(0..5000),
                "price_per_unit": price,
            })));
        }
        self.gateway.insert(tables::MEDICATIONS, rows).await
    }

    async fn seed_appointments(&mut self, patients: &[i64], employees: &[i64]) -> GatewayResult<usize> {
        let mut rows = Vec::new();
        for _ in 0..self.counts.appointments {
            let offset = Duration::minutes(self.rng.gen_range(-30 * 24 * 60..30 * 24 * 60));
            let at = self.now + offset;
            let past = at < self.now;
            let stamp = at.to_rfc3339();
            rows.push(object(json!({
                "appt_datetime": stamp,
                "appt_type": pick(&mut self.rng, APPT_TYPES),
                "status": if past { "Completed" } else { pick(&mut self.rng, FUTURE_STATUSES) },
                "room": format!("Room {}", self.rng.gen_range(100..500)),
                "check_in_time": if past { Value::String(stamp.clone()) } else { Value::Null },
                "chief_complaint": pick(&mut self.rng, COMPLAINTS),
                "patient_id": patients.choose(&mut self.rng).copied(),
                "employee_id": employees.choose(&mut self.rng).copied(),
            })));
        }
        Ok(self.gateway.insert(tables::APPOINTMENTS, rows).await?.len())
    }

    async fn seed_billing(&mut self, patients: &[Row]) -> GatewayResult<usize> {
        let mut rows = Vec::new();
        for _ in 0..self.counts.billing {
            let Some(patient) = patients.choose(&mut self.rng) else {
                break;
            };
            let text = |key: &str| patient.get(key).cloned().unwrap_or(Value::Null);
            let first = patient.get("first_name").and_then(Value::as_str).unwrap_or_default();
            let last = patient.get("last_name").and_then(Value::as_str).unwrap_or_default();

            let admission = self.now - Duration::days(self.rng.gen_range(0..45));
            let discharge = admission + Duration::days(self.rng.gen_range(1..10));
            let total = self.rng.gen_range(50_000..5_000_000) as f64 / 100.0;
            let covered = (total * self.rng.gen_range(0.5..0.9) * 100.0).round() / 100.0;
            let paid = ((total - covered) * 100.0).round() / 100.0;
            let policy: String = (0..10)
                .map(|_| {
                    let chars = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";
                    chars[self.rng.gen_range(0..chars.len())] as char
                })
                .collect();

            rows.push(object(json!({
                "billing_number": format!("INV-{:06}", self.rng.gen_range(0..1_000_000)),
                "patient_name": format!("{first} {last}"),
                "patient_id": text("patient_id"),
                "admission_date": date(admission),
                "discharge_date": date(discharge),
                "total_charges": total,
                "amount_covered_by_insurance": covered,
                "amount_paid": paid,
                "running_balance": 0,
                "payment_status": pick(&mut self.rng, PAYMENT_STATUSES),
                "insurance_provider": pick(&mut self.rng, INSURERS),
                "policy_number": policy,
                "service_description": format!("{} Treatment", pick(&mut self.rng, SERVICES)),
                "address": text("address"),
                "date_of_birth": text("birthday"),
                "email": format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                "gender": text("gender"),
                "phone_number": text("phone_number"),
            })));
        }
        Ok(self.gateway.insert(tables::BILLING, rows).await?.len())
    }

    async fn seed_prescriptions(
        &mut self,
        patients: &[i64],
        employees: &[i64],
        medications: &[i64],
    ) -> GatewayResult<usize> {
        let mut rows = Vec::new();
        for _ in 0..self.counts.prescriptions {
            let at = self.now - Duration::minutes(self.rng.gen_range(0..60 * 24 * 60));
            rows.push(object(json!({
                "patient_id": patients.choose(&mut self.rng).copied(),
                "employee_id": employees.choose(&mut self.rng).copied(),
                "medication_id": medications.choose(&mut self.rng).copied(),
                "prescription_date": at.to_rfc3339(),
                "dosage_instructions": format!("{} times daily", self.rng.gen_range(1..=3)),
            })));
        }
        Ok(self.gateway.insert(tables::PRESCRIPTIONS, rows).await?.len())
    }

    async fn seed_announcements(&mut self) -> GatewayResult<usize> {
        let notices = [
            (
                "Welcome to the Staff Portal",
                "Department records, announcements and analytics are now available in one place.",
            ),
            (
                "Flu Vaccination Drive",
                "Free flu shots for all staff in Building A, weekdays 8am to 4pm.",
            ),
            (
                "Scheduled Maintenance",
                "The records system will be read-only on Sunday between 1am and 3am.",
            ),
        ];
        let rows: Vec<Row> = notices
            .iter()
            .cycle()
            .take(self.counts.announcements as usize)
            .map(|(title, content)| object(json!({"title": title, "content": content})))
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }
        Ok(self.gateway.insert(tables::ANNOUNCEMENTS, rows).await?.len())
    }
}
