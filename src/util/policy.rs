//! Role policy: one explicit allow-list per protected action.
//!
//! Handlers call [`authorize`] directly instead of stacking role middleware,
//! so every permission check is visible at the call site.

use crate::model::user::Role;
use crate::util::error::ServiceError;

/// A protected action a caller may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewTransactions,
    ViewAnalytics,
    EditTransactions,
    DeleteTransactions,
    ManageUsers,
    ViewActivityLog,
    ExportData,
}

impl Capability {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::ViewTransactions | Capability::ViewAnalytics => {
                &[Role::Admin, Role::Analyst, Role::Viewer]
            }
            Capability::EditTransactions => &[Role::Admin, Role::Analyst],
            Capability::DeleteTransactions => &[Role::Admin],
            Capability::ManageUsers | Capability::ViewActivityLog => &[Role::Admin],
            Capability::ExportData => &[Role::Admin, Role::Analyst],
        }
    }
}

/// Fails with `Forbidden` unless `role` is on the capability's allow-list.
pub fn authorize(role: Role, capability: Capability) -> Result<(), ServiceError> {
    let allowed = capability.allowed_roles();
    if allowed.contains(&role) {
        return Ok(());
    }
    let roles = allowed
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ServiceError::Forbidden(format!(
        "Access denied. Required roles: {}",
        roles
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_can_only_view() {
        assert!(authorize(Role::Viewer, Capability::ViewTransactions).is_ok());
        assert!(authorize(Role::Viewer, Capability::ViewAnalytics).is_ok());
        assert!(authorize(Role::Viewer, Capability::EditTransactions).is_err());
        assert!(authorize(Role::Viewer, Capability::DeleteTransactions).is_err());
        assert!(authorize(Role::Viewer, Capability::ExportData).is_err());
        assert!(authorize(Role::Viewer, Capability::ManageUsers).is_err());
    }

    #[test]
    fn test_analyst_edits_but_never_deletes() {
        assert!(authorize(Role::Analyst, Capability::EditTransactions).is_ok());
        assert!(authorize(Role::Analyst, Capability::ExportData).is_ok());
        assert!(authorize(Role::Analyst, Capability::DeleteTransactions).is_err());
        assert!(authorize(Role::Analyst, Capability::ManageUsers).is_err());
        assert!(authorize(Role::Analyst, Capability::ViewActivityLog).is_err());
    }

    #[test]
    fn test_admin_has_every_capability() {
        for capability in [
            Capability::ViewTransactions,
            Capability::ViewAnalytics,
            Capability::EditTransactions,
            Capability::DeleteTransactions,
            Capability::ManageUsers,
            Capability::ViewActivityLog,
            Capability::ExportData,
        ] {
            assert!(authorize(Role::Admin, capability).is_ok());
        }
    }
}
