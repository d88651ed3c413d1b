//! Note template visibility levels and field validation.
//!
//! Validation collects every problem into a [`FieldErrors`] list so callers
//! get field-level detail in one response instead of the first failure only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::types::DbId;

/* --------------------------------------------------------------------------
   Validation limits
   -------------------------------------------------------------------------- */

/// Maximum length for a template name.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length for a template description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum length for the memo body.
pub const MAX_MEMO_LEN: usize = 100_000;

/* --------------------------------------------------------------------------
   Visibility
   -------------------------------------------------------------------------- */

/// Who may see a template in listings.
///
/// `Open` needs no further check. `Roles` and `Mine` are restricted: the
/// permission oracle decides per user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every project member allowed to see templates.
    #[default]
    Open,
    /// Visible to members holding one of the template's roles.
    Roles,
    /// Visible to the author only.
    Mine,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Open, Visibility::Roles, Visibility::Mine];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Open => "open",
            Visibility::Roles => "roles",
            Visibility::Mine => "mine",
        }
    }

    pub fn is_restricted(self) -> bool {
        self != Visibility::Open
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visibility::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = Visibility::ALL.iter().map(|v| v.as_str()).collect();
                format!("'{s}' is not one of: {}", valid.join(", "))
            })
    }
}

/* --------------------------------------------------------------------------
   Field error collection
   -------------------------------------------------------------------------- */

/// Accumulates field-level validation failures.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record the error of `result`, if any, against `field`.
    pub fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.push(field, message);
        }
    }

    /// Like [`check`](Self::check), but keeps the parsed value on success.
    pub fn capture<T>(&mut self, field: &'static str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.0))
        }
    }
}

/* --------------------------------------------------------------------------
   Validation functions
   -------------------------------------------------------------------------- */

/// Template name: non-blank and within the length limit.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("cannot be blank".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("is too long (maximum is {MAX_NAME_LEN} characters)"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "is too long (maximum is {MAX_DESCRIPTION_LEN} characters)"
        ));
    }
    Ok(())
}

/// Memo may be empty but must stay within the size limit.
pub fn validate_memo(memo: &str) -> Result<(), String> {
    if memo.chars().count() > MAX_MEMO_LEN {
        return Err(format!("is too long (maximum is {MAX_MEMO_LEN} characters)"));
    }
    Ok(())
}

/// Parse a visibility string into [`Visibility`].
pub fn parse_visibility(visibility: &str) -> Result<Visibility, String> {
    visibility.parse()
}

/// Role-restricted templates must name at least one role.
pub fn validate_role_ids(visibility: Visibility, role_ids: &[DbId]) -> Result<(), String> {
    if visibility == Visibility::Roles && role_ids.is_empty() {
        return Err("must list at least one role when visibility is 'roles'".to_string());
    }
    if role_ids.iter().any(|&id| id <= 0) {
        return Err("must contain only positive role ids".to_string());
    }
    Ok(())
}

/// A referenced id (project, tracker) must be present.
pub fn validate_required_id(id: Option<DbId>) -> Result<DbId, String> {
    match id {
        Some(id) if id > 0 => Ok(id),
        Some(_) => Err("is invalid".to_string()),
        None => Err("is required".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- Visibility ----------------------------------------------------------

    #[test]
    fn visibility_round_trips_through_str() {
        for v in Visibility::ALL {
            assert_eq!(v.as_str().parse::<Visibility>(), Ok(v));
        }
    }

    #[test]
    fn unknown_visibility_rejected() {
        let err = parse_visibility("public").unwrap_err();
        assert!(err.contains("open, roles, mine"));
    }

    #[test]
    fn only_open_is_unrestricted() {
        assert!(!Visibility::Open.is_restricted());
        assert!(Visibility::Roles.is_restricted());
        assert!(Visibility::Mine.is_restricted());
    }

    #[test]
    fn visibility_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Visibility::Roles).ok().as_deref(),
            Some("\"roles\"")
        );
    }

    // -- validate_name -------------------------------------------------------

    #[test]
    fn blank_name_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn name_at_limit_accepted() {
        assert!(validate_name(&"n".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"n".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    // -- validate_memo / validate_description --------------------------------

    #[test]
    fn empty_memo_accepted() {
        assert!(validate_memo("").is_ok());
    }

    #[test]
    fn oversized_description_rejected() {
        assert!(validate_description(&"d".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
    }

    // -- validate_role_ids ---------------------------------------------------

    #[test]
    fn roles_visibility_requires_roles() {
        assert!(validate_role_ids(Visibility::Roles, &[]).is_err());
        assert!(validate_role_ids(Visibility::Roles, &[3]).is_ok());
        assert!(validate_role_ids(Visibility::Open, &[]).is_ok());
    }

    // -- validate_required_id ------------------------------------------------

    #[test]
    fn missing_id_reported() {
        assert_eq!(validate_required_id(None), Err("is required".to_string()));
        assert!(validate_required_id(Some(0)).is_err());
        assert_eq!(validate_required_id(Some(9)), Ok(9));
    }

    // -- FieldErrors ---------------------------------------------------------

    #[test]
    fn field_errors_collect_all_failures() {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_name(""));
        errors.check("memo", validate_memo("fine"));
        errors.check(
            "tracker_id",
            validate_required_id(None).map(|_| ()),
        );

        assert_matches!(errors.into_result(), Err(CoreError::Validation(fields)) => {
            let names: Vec<_> = fields.iter().map(|f| f.field).collect();
            assert_eq!(names, vec!["name", "tracker_id"]);
        });
    }

    #[test]
    fn empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
