use thiserror::Error;

use crate::domain::department::Department;
use crate::shared::DomainError;

/// Substrings of a department name that mark its members as executives.
pub const EXECUTIVE_KEYWORDS: [&str; 4] = ["administration", "executive", "management", "admin"];

/// Anything a navigation or request may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Department(Department),
    AnnouncementManager,
    Analytics,
    DataExplorer,
}

impl Resource {
    pub fn executive_only(&self) -> bool {
        !matches!(self, Self::Department(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Access Denied: You must be signed in.")]
    NotSignedIn,

    #[error("Access Denied: You do not have permission to view this department.")]
    Department(Department),

    #[error("Access Denied: Only Executive staff can manage announcements.")]
    AnnouncementManager,

    #[error("Access Denied: Only Executive staff can access Analytics.")]
    Analytics,

    #[error("Access Denied: Only Executive staff can access the Data Explorer.")]
    DataExplorer,
}

impl From<AccessDenied> for DomainError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::NotSignedIn => DomainError::Unauthorized(denied.to_string()),
            other => DomainError::Forbidden(other.to_string()),
        }
    }
}

/// Department-based only; the job title never grants anything.
pub fn is_executive(department: Option<&str>) -> bool {
    let Some(department) = department else {
        return false;
    };
    let department = department.to_lowercase();
    EXECUTIVE_KEYWORDS.iter().any(|k| department.contains(k))
}

pub fn is_authorized(department: Option<&str>, resource: Resource) -> bool {
    let Some(user_department) = department else {
        return false;
    };
    if is_executive(Some(user_department)) {
        return true;
    }
    match resource {
        Resource::Department(target) => {
            user_department.trim().to_lowercase() == target.label().trim().to_lowercase()
        }
        _ => false,
    }
}

/// `session_department` is `None` for an anonymous caller and `Some(None)`
/// for a signed-in user without a department.
pub fn authorize(
    session_department: Option<Option<&str>>,
    resource: Resource,
) -> Result<(), AccessDenied> {
    let Some(department) = session_department else {
        return Err(AccessDenied::NotSignedIn);
    };
    if is_authorized(department, resource) {
        return Ok(());
    }
    Err(match resource {
        Resource::Department(d) => AccessDenied::Department(d),
        Resource::AnnouncementManager => AccessDenied::AnnouncementManager,
        Resource::Analytics => AccessDenied::Analytics,
        Resource::DataExplorer => AccessDenied::DataExplorer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_RESOURCES: [Resource; 8] = [
        Resource::Department(Department::PatientRecords),
        Resource::Department(Department::Billing),
        Resource::Department(Department::Appointments),
        Resource::Department(Department::Pharmacy),
        Resource::Department(Department::HumanResources),
        Resource::AnnouncementManager,
        Resource::Analytics,
        Resource::DataExplorer,
    ];

    #[test]
    fn test_executive_keywords_are_case_insensitive_substrings() {
        assert!(is_executive(Some("Executive Director")));
        assert!(is_executive(Some("administration")));
        assert!(is_executive(Some("Hospital MANAGEMENT")));
        assert!(is_executive(Some("Admin")));
        assert!(!is_executive(Some("Pharmacy and Inventory")));
        assert!(!is_executive(Some("")));
        assert!(!is_executive(None));
    }

    #[test]
    fn test_executive_reaches_everything() {
        for resource in ALL_RESOURCES {
            assert!(is_authorized(Some("Administration"), resource), "{resource:?}");
        }
    }

    #[test]
    fn test_department_match_is_trimmed_and_case_insensitive() {
        for dept in Department::ALL {
            let padded = format!("  {}  ", dept.label().to_uppercase());
            for other in Department::ALL {
                assert_eq!(
                    is_authorized(Some(&padded), Resource::Department(other)),
                    dept == other
                );
            }
        }
    }

    #[test]
    fn test_pharmacy_manager_gets_no_cross_department_access() {
        // The job title is "Pharmacy Manager"; only the department counts.
        let dept = Some("Pharmacy and Inventory");
        assert!(is_authorized(dept, Resource::Department(Department::Pharmacy)));
        assert!(!is_authorized(dept, Resource::Department(Department::HumanResources)));
        assert!(!is_authorized(dept, Resource::Analytics));
        assert!(!is_authorized(dept, Resource::AnnouncementManager));
    }

    #[test]
    fn test_no_department_is_never_authorized() {
        for resource in ALL_RESOURCES {
            assert!(!is_authorized(None, resource));
        }
    }

    #[test]
    fn test_authorize_messages() {
        let err = authorize(Some(Some("Billing and Insurance")), Resource::Analytics).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Access Denied: Only Executive staff can access Analytics."
        );

        let err = authorize(
            Some(Some("Billing and Insurance")),
            Resource::Department(Department::PatientRecords),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Access Denied: You do not have permission to view this department."
        );

        assert_eq!(
            authorize(None, Resource::Analytics),
            Err(AccessDenied::NotSignedIn)
        );
    }

    #[test]
    fn test_denial_maps_to_domain_error() {
        let err: DomainError = AccessDenied::AnnouncementManager.into();
        assert!(matches!(err, DomainError::Forbidden(_)));
        let err: DomainError = AccessDenied::NotSignedIn.into();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
