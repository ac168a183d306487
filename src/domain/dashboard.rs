use serde::Serialize;
use utoipa::ToSchema;

/// Headline counters shown on the dashboard. Recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FactMetrics {
    pub total_employees: u64,
    pub patients_admitted: u64,
    pub pending_bills: u64,
    pub medicine_stock: f64,
    pub appointments_scheduled: u64,
    /// `false` when the backend could not be read; the counters are then zero.
    pub available: bool,
}

impl FactMetrics {
    pub fn unavailable() -> Self {
        Self::default()
    }
}
