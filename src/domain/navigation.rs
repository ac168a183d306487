//! Portal navigation state.
//!
//! The current page and signed-in user live in one explicit value that only
//! changes through [`PortalState::reduce`]. Denied navigations leave the
//! state untouched.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::access::{authorize, AccessDenied, Resource};
use crate::domain::department::Department;
use crate::domain::session::UserSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    Department(Department),
    AnnouncementManager,
    Analytics,
    DataExplorer,
}

impl Page {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Dashboard => "dashboard",
            Self::Department(d) => d.slug(),
            Self::AnnouncementManager => "announcement-manager",
            Self::Analytics => "analytics",
            Self::DataExplorer => "data-explorer",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "login" => Some(Self::Login),
            "dashboard" => Some(Self::Dashboard),
            "announcement-manager" => Some(Self::AnnouncementManager),
            "analytics" => Some(Self::Analytics),
            "data-explorer" => Some(Self::DataExplorer),
            other => Department::from_slug(other).map(Self::Department),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::Department(d) => d.label(),
            Self::AnnouncementManager => "Announcement Manager",
            Self::Analytics => "Analytics",
            Self::DataExplorer => "Data Explorer",
        }
    }

    /// `None` for pages every signed-in user may open.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Login | Self::Dashboard => None,
            Self::Department(d) => Some(Resource::Department(*d)),
            Self::AnnouncementManager => Some(Resource::AnnouncementManager),
            Self::Analytics => Some(Resource::Analytics),
            Self::DataExplorer => Some(Resource::DataExplorer),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Login(UserSession),
    Logout,
    Navigate(Page),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalState {
    pub page: Page,
    pub user: Option<UserSession>,
}

impl Default for PortalState {
    fn default() -> Self {
        Self {
            page: Page::Login,
            user: None,
        }
    }
}

impl PortalState {
    /// State for a user resuming an existing session.
    pub fn signed_in(user: UserSession) -> Self {
        Self {
            page: Page::Dashboard,
            user: Some(user),
        }
    }

    pub fn reduce(self, action: Action) -> Result<Self, AccessDenied> {
        match action {
            Action::Login(user) => Ok(Self::signed_in(user)),
            Action::Logout => Ok(Self::default()),
            Action::Navigate(Page::Login) => Ok(Self::default()),
            Action::Navigate(target) => {
                let Some(user) = self.user.as_ref() else {
                    return Err(AccessDenied::NotSignedIn);
                };
                if let Some(resource) = target.resource() {
                    authorize(Some(user.department.as_deref()), resource)?;
                }
                Ok(Self {
                    page: target,
                    ..self
                })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuEntry {
    pub page: String,
    pub label: String,
    pub enabled: bool,
}

/// Sidebar entries in display order; executive tools only appear for executives.
pub fn menu(user: &UserSession) -> Vec<MenuEntry> {
    let department = user.department.as_deref();
    let mut pages = vec![Page::Dashboard];
    pages.extend(Department::ALL.into_iter().map(Page::Department));
    if user.is_executive() {
        pages.extend([Page::AnnouncementManager, Page::Analytics, Page::DataExplorer]);
    }
    pages
        .into_iter()
        .map(|page| MenuEntry {
            page: page.slug().to_string(),
            label: page.label().to_string(),
            enabled: page
                .resource()
                .map_or(true, |r| crate::domain::access::is_authorized(department, r)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(department: Option<&str>) -> UserSession {
        UserSession {
            name: "Test User".to_string(),
            email: "test@hospital.org".to_string(),
            department: department.map(str::to_string),
            job_title: Some("Pharmacy Manager".to_string()),
        }
    }

    #[test]
    fn test_login_then_navigate_own_department() {
        let state = PortalState::default()
            .reduce(Action::Login(user(Some("Pharmacy and Inventory"))))
            .unwrap();
        assert_eq!(state.page, Page::Dashboard);

        let state = state
            .reduce(Action::Navigate(Page::Department(Department::Pharmacy)))
            .unwrap();
        assert_eq!(state.page, Page::Department(Department::Pharmacy));
    }

    #[test]
    fn test_denied_navigation_reports_reason() {
        let state = PortalState::signed_in(user(Some("Pharmacy and Inventory")));
        let err = state
            .clone()
            .reduce(Action::Navigate(Page::Analytics))
            .unwrap_err();
        assert_eq!(err, AccessDenied::Analytics);
        assert_eq!(state.page, Page::Dashboard);
    }

    #[test]
    fn test_navigate_without_user_is_rejected() {
        let err = PortalState::default()
            .reduce(Action::Navigate(Page::Dashboard))
            .unwrap_err();
        assert_eq!(err, AccessDenied::NotSignedIn);
    }

    #[test]
    fn test_logout_clears_user() {
        let state = PortalState::signed_in(user(Some("Administration")))
            .reduce(Action::Logout)
            .unwrap();
        assert_eq!(state, PortalState::default());
    }

    #[test]
    fn test_page_slugs_round_trip() {
        let mut pages = vec![
            Page::Login,
            Page::Dashboard,
            Page::AnnouncementManager,
            Page::Analytics,
            Page::DataExplorer,
        ];
        pages.extend(Department::ALL.into_iter().map(Page::Department));
        for page in pages {
            assert_eq!(Page::from_slug(page.slug()), Some(page));
        }
    }

    #[test]
    fn test_menu_for_department_user() {
        let entries = menu(&user(Some("Billing and Insurance")));
        assert_eq!(entries.len(), 6);
        let enabled: Vec<&str> = entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.page.as_str())
            .collect();
        assert_eq!(enabled, vec!["dashboard", "billing"]);
    }

    #[test]
    fn test_menu_for_executive_lists_tools() {
        let entries = menu(&user(Some("Executive Office")));
        assert_eq!(entries.len(), 9);
        assert!(entries.iter().all(|e| e.enabled));
    }
}
