//! Migration success policy
//!
//! A migration copies as much as it can and reports per-file failures. The
//! `MigrationPolicy` decides afterwards whether the copy is complete enough
//! for the switch to commit.

use crate::model::MigrationReport;

/// Verdict of a policy over a finished migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Accept,
    Reject { reason: String },
}

impl PolicyDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, PolicyDecision::Accept)
    }
}

/// Policy trait evaluated after a migration and before the switch commits
pub trait MigrationPolicy: Send + Sync {
    fn evaluate(&self, report: &MigrationReport) -> PolicyDecision;
}

/// Commit only when the manifest and at least one ingredient record arrived.
///
/// # Example
/// ```
/// use pantryman_core::model::{FileKind, MigrationReport};
/// use pantryman_core::policy::{MigrationPolicy, RequireManifestAndRecord};
///
/// let mut report = MigrationReport::new();
/// report.record_copied(FileKind::Manifest, "pantry.yaml");
/// assert!(!RequireManifestAndRecord.evaluate(&report).is_accept());
///
/// report.record_copied(FileKind::Ingredient, "salt.yaml");
/// assert!(RequireManifestAndRecord.evaluate(&report).is_accept());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireManifestAndRecord;

impl MigrationPolicy for RequireManifestAndRecord {
    fn evaluate(&self, report: &MigrationReport) -> PolicyDecision {
        if !report.manifest_copied() {
            return PolicyDecision::Reject {
                reason: format!("manifest was not copied; {}", report.summary()),
            };
        }
        if report.ingredient_records_copied() == 0 {
            return PolicyDecision::Reject {
                reason: format!("no ingredient records were copied; {}", report.summary()),
            };
        }
        PolicyDecision::Accept
    }
}

/// Accepts any report (for callers that only want a best-effort copy).
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyCopy;

impl MigrationPolicy for AcceptAnyCopy {
    fn evaluate(&self, _report: &MigrationReport) -> PolicyDecision {
        PolicyDecision::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileKind;

    #[test]
    fn test_rejects_without_manifest() {
        let mut report = MigrationReport::new();
        report.record_copied(FileKind::Ingredient, "salt.yaml");
        report.record_failure(FileKind::Manifest, "pantry.yaml", "denied");

        match RequireManifestAndRecord.evaluate(&report) {
            PolicyDecision::Reject { reason } => {
                assert!(reason.contains("manifest"));
                assert!(reason.contains("denied"));
            }
            PolicyDecision::Accept => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_partial_record_failures_still_accept() {
        let mut report = MigrationReport::new();
        report.record_copied(FileKind::Manifest, "pantry.yaml");
        report.record_copied(FileKind::Ingredient, "salt.yaml");
        report.record_failure(FileKind::Ingredient, "pepper.yaml", "io");

        assert_eq!(
            RequireManifestAndRecord.evaluate(&report),
            PolicyDecision::Accept
        );
    }

    #[test]
    fn test_accept_any_copy() {
        assert!(AcceptAnyCopy.evaluate(&MigrationReport::new()).is_accept());
    }
}
