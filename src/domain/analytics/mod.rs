//! Analytics rollups
//!
//! Visit trends, provider and medication rankings and the department
//! performance matrix, computed in memory from five fetched tables.

pub mod aggregator;
pub mod records;

pub use aggregator::{
    build_report, department_matrix, normalize_department, top_medications, top_providers,
    visit_trend, AnalyticsReport, DepartmentPerformance, NamedCount,
};
pub use records::AnalyticsInputs;
