//! Shared primitives for all Rust crates in Guildkeep.

#![forbid(unsafe_code)]

/// Strongly typed identifiers shared across crates.
pub mod ids;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ids::{ClusterId, GuildId, GuildMembershipId, PermissionId, RoleId, UserId};

/// Result type used across Guildkeep crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string with surrounding whitespace removed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Principal is blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A role with the same name already exists in the target scope.
    #[error("duplicate role name: {0}")]
    DuplicateRoleName(String),

    /// System role templates cannot be renamed or deleted.
    #[error("system role is immutable: {0}")]
    SystemRoleImmutable(String),

    /// The referenced guild or cluster does not exist.
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// A custom role was bound outside the scope that owns it.
    #[error("scope mismatch: {0}")]
    ScopeMismatch(String),

    /// The referenced role does not exist.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The referenced permission does not exist in the catalog.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// The referenced user does not exist.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The permission is still bound to at least one role.
    #[error("permission in use: {0}")]
    PermissionInUse(String),

    /// Role names referenced during bootstrap do not resolve to registered roles.
    #[error("unresolved role references: {}", .0.join(", "))]
    UnresolvedRoleReference(Vec<String>),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  Events Lead ").unwrap_or_else(|_| unreachable!());
        assert_eq!(value.as_str(), "Events Lead");
    }

    #[test]
    fn unresolved_role_reference_lists_every_name() {
        let error =
            AppError::UnresolvedRoleReference(vec!["OWNER".to_owned(), "CREATOR".to_owned()]);
        assert_eq!(
            error.to_string(),
            "unresolved role references: OWNER, CREATOR"
        );
    }
}
