//! Specification domain model — the aggregate root of the registry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration lifecycle label of a specification.
///
/// Stored as its canonical display string. Parsing is case-insensitive;
/// listings that exclude unreviewed specifications filter out
/// [`Submitted`](RegistrationStatus::Submitted) and
/// [`InProgress`](RegistrationStatus::InProgress) rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegistrationStatus {
    Submitted,
    InProgress,
    UnderReview,
    Verified,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::InProgress => "In Progress",
            Self::UnderReview => "Under Review",
            Self::Verified => "Verified",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(Self::Submitted),
            "in progress" => Ok(Self::InProgress),
            "under review" => Ok(Self::UnderReview),
            "verified" => Ok(Self::Verified),
            other => Err(format!("unknown registration status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    pub id: Uuid,
    /// Business identifier of the specification (not enforced unique).
    pub specification_identifier: String,
    pub specification_name: String,
    pub sector: String,
    pub sub_sector: Option<String>,
    pub purpose: String,
    pub specification_version: Option<String>,
    pub contact_information: String,
    pub date_of_implementation: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub is_country_specification: bool,
    pub underlying_specification_identifier: Option<String>,
    pub specification_source_link: Option<String>,
    pub core_version: Option<String>,
    pub preferred_syntax: Option<String>,
    pub implementation_status: Option<String>,
    pub registration_status: Option<RegistrationStatus>,
    pub specification_type: Option<String>,
    pub conformance_level: Option<String>,
    /// Owning group; the unit of write-ownership.
    pub user_group_id: Option<Uuid>,
    pub created_date: DateTime<Utc>,
    /// Refreshed whenever the specification or any of its children change.
    pub modified_date: DateTime<Utc>,
}

/// Read model: a specification together with its owning group's name,
/// resolved at the repository boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationWithGroup {
    pub specification: Specification,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpecification {
    pub specification_identifier: String,
    pub specification_name: String,
    pub sector: String,
    pub sub_sector: Option<String>,
    pub purpose: String,
    pub specification_version: Option<String>,
    pub contact_information: String,
    pub date_of_implementation: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub is_country_specification: bool,
    pub underlying_specification_identifier: Option<String>,
    pub specification_source_link: Option<String>,
    pub core_version: Option<String>,
    pub preferred_syntax: Option<String>,
    pub implementation_status: Option<String>,
    pub registration_status: Option<RegistrationStatus>,
    pub specification_type: Option<String>,
    pub conformance_level: Option<String>,
    /// Explicit target group. For role `User` the service overrides this
    /// with the caller's own group; for `Admin` it is validated and used
    /// as-is (or left `None` for an unowned specification).
    pub user_group_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSpecification {
    pub specification_identifier: Option<String>,
    pub specification_name: Option<String>,
    pub sector: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub sub_sector: Option<Option<String>>,
    pub purpose: Option<String>,
    pub specification_version: Option<Option<String>>,
    pub contact_information: Option<String>,
    pub date_of_implementation: Option<Option<DateTime<Utc>>>,
    pub country: Option<Option<String>>,
    pub is_country_specification: Option<bool>,
    pub underlying_specification_identifier: Option<Option<String>>,
    pub specification_source_link: Option<Option<String>>,
    pub core_version: Option<Option<String>>,
    pub preferred_syntax: Option<Option<String>>,
    pub implementation_status: Option<Option<String>>,
    pub registration_status: Option<Option<RegistrationStatus>>,
    pub specification_type: Option<Option<String>>,
    pub conformance_level: Option<Option<String>>,
    pub user_group_id: Option<Option<Uuid>>,
}

impl UpdateSpecification {
    /// Whether this update would change the owning group of a
    /// specification currently owned by `current`.
    pub fn changes_group(&self, current: Option<Uuid>) -> bool {
        match self.user_group_id {
            Some(target) => target != current,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_status_parses_case_insensitively() {
        assert_eq!(
            "SUBMITTED".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::Submitted
        );
        assert_eq!(
            "in progress".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::InProgress
        );
        assert_eq!(
            " Under Review ".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::UnderReview
        );
        assert!("zzz".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn registration_status_roundtrips_through_display() {
        for status in [
            RegistrationStatus::Submitted,
            RegistrationStatus::InProgress,
            RegistrationStatus::UnderReview,
            RegistrationStatus::Verified,
        ] {
            assert_eq!(status.as_str().parse::<RegistrationStatus>(), Ok(status));
        }
    }

    #[test]
    fn changes_group_detects_reassignment() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let update = UpdateSpecification {
            user_group_id: Some(Some(b)),
            ..Default::default()
        };
        assert!(update.changes_group(Some(a)));
        assert!(!update.changes_group(Some(b)));

        let unassign = UpdateSpecification {
            user_group_id: Some(None),
            ..Default::default()
        };
        assert!(unassign.changes_group(Some(a)));
        assert!(!unassign.changes_group(None));

        let untouched = UpdateSpecification::default();
        assert!(!untouched.changes_group(Some(a)));
    }
}
