//! Role-based access policy
//!
//! Pure functions deciding which department pages and executive tools a
//! signed-in user may reach. The HTTP layer runs them before every
//! protected handler; backend row-level policies stay the real boundary.

pub mod policy;

pub use policy::{authorize, is_authorized, is_executive, AccessDenied, Resource, EXECUTIVE_KEYWORDS};
