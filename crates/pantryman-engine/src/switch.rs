//! Directory switch orchestration
//!
//! ## Attempt lifecycle
//! ```text
//! Idle -> CandidateSelected -> Classified{Empty|ValidDataset|Invalid}
//!      -> {Migrating | SwitchingDirect | Rejected} -> {Committed | Failed} -> Idle
//! ```
//! `select` classifies the candidate and returns a proposal; `confirm` runs
//! it; `cancel` or dropping the proposal abandons it. Only one attempt
//! exists at a time. The active root
//! preference is written only in the commit step, after all I/O succeeded,
//! and the change is then published to the engine owner.

use crate::notifier::{ChangeEvent, ChangePublisher};
use pantryman_core::errors::{ExError, ExErrorKind, PantryError};
use pantryman_core::model::{MigrationReport, StorageRoot};
use pantryman_core::policy::{MigrationPolicy, PolicyDecision, RequireManifestAndRecord};
use pantryman_core::{log_degraded, log_op_end, log_op_error, log_op_start};
use pantryman_core_types::AttemptId;
use pantryman_store::errors::Result;
use pantryman_store::locator::StorageLocator;
use pantryman_store::migrator::Migrator;
use pantryman_store::validator::{StorageClass, StorageValidator};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Where the current attempt is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    CandidateSelected,
    Classified(StorageClass),
    Migrating,
    SwitchingDirect,
    Rejected,
    Committed,
    Failed,
}

/// What confirming a proposal will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchPlan {
    /// Candidate is empty: copy the active dataset into it
    Migrate { from: StorageRoot, from_path: PathBuf },
    /// Candidate already holds a dataset: use it as-is
    Adopt,
}

/// A classified candidate awaiting the user's decision.
///
/// The proposal holds the controller's attempt slot while it is only an
/// offer; dropping it unconfirmed frees the slot for the next selection.
#[derive(Debug)]
pub struct SwitchProposal {
    attempt_id: AttemptId,
    candidate: StorageRoot,
    candidate_path: PathBuf,
    plan: SwitchPlan,
    _offer: OfferGuard,
}

impl SwitchProposal {
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn candidate(&self) -> &StorageRoot {
        &self.candidate
    }

    pub fn candidate_path(&self) -> &Path {
        &self.candidate_path
    }

    pub fn plan(&self) -> &SwitchPlan {
        &self.plan
    }

    /// Prompt text for the user
    pub fn describe(&self) -> String {
        match &self.plan {
            SwitchPlan::Migrate { from, .. } => format!(
                "{} is empty. Copy the current data from {} into it and switch?",
                self.candidate, from
            ),
            SwitchPlan::Adopt => format!(
                "{} already contains pantry data. Switch to it without copying?",
                self.candidate
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchMode {
    Migrated(MigrationReport),
    Adopted,
}

/// A committed switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub attempt_id: AttemptId,
    pub root: StorageRoot,
    pub path: PathBuf,
    pub mode: SwitchMode,
}

#[derive(Debug)]
struct Attempt {
    id: AttemptId,
    state: SwitchState,
}

type AttemptSlot = Arc<Mutex<Option<Attempt>>>;

fn lock_slot(slot: &AttemptSlot) -> MutexGuard<'_, Option<Attempt>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases the attempt slot if its offer is still undecided when dropped
struct OfferGuard {
    id: AttemptId,
    slot: AttemptSlot,
}

impl std::fmt::Debug for OfferGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OfferGuard").field(&self.id).finish()
    }
}

impl Drop for OfferGuard {
    fn drop(&mut self) {
        let mut slot = lock_slot(&self.slot);
        let undecided = slot.as_ref().is_some_and(|a| {
            a.id == self.id
                && matches!(a.state, SwitchState::CandidateSelected | SwitchState::Classified(_))
        });
        if undecided {
            tracing::info!(attempt_id = %self.id, "Switch proposal abandoned");
            *slot = None;
        }
    }
}

/// Coordinates locator, validator, migrator, preference commit and the
/// change notification for one switch attempt at a time.
///
/// Cloning shares the attempt guard, so a clone can confirm on a worker
/// thread while the original reports `SwitchInFlight` to new selections.
#[derive(Clone)]
pub struct DirectorySwitchController {
    locator: Arc<StorageLocator>,
    validator: StorageValidator,
    migrator: Migrator,
    policy: Arc<dyn MigrationPolicy>,
    publisher: ChangePublisher,
    attempt: AttemptSlot,
}

impl std::fmt::Debug for DirectorySwitchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySwitchController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DirectorySwitchController {
    pub fn new(locator: Arc<StorageLocator>, publisher: ChangePublisher) -> Self {
        Self {
            locator,
            validator: StorageValidator::new(),
            migrator: Migrator::new(),
            policy: Arc::new(RequireManifestAndRecord),
            publisher,
            attempt: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_migrator(mut self, migrator: Migrator) -> Self {
        self.migrator = migrator;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn MigrationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SwitchState {
        self.lock()
            .as_ref()
            .map(|a| a.state.clone())
            .unwrap_or(SwitchState::Idle)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Attempt>> {
        lock_slot(&self.attempt)
    }

    fn transition(&self, id: &AttemptId, state: SwitchState) {
        let mut slot = self.lock();
        if let Some(attempt) = slot.as_mut().filter(|a| &a.id == id) {
            tracing::debug!(attempt_id = %id, from = ?attempt.state, to = ?state, "Switch transition");
            attempt.state = state;
        }
    }

    /// Move to a terminal state and release the attempt guard
    fn finish(&self, id: &AttemptId, terminal: SwitchState) {
        self.transition(id, terminal);
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|a| &a.id == id) {
            *slot = None;
        }
    }

    /// Classify `candidate` and propose how to switch to it.
    ///
    /// # Errors
    ///
    /// - `SwitchInFlight` if another attempt has not finished
    /// - `AlreadyActive` if `candidate` is the active root
    /// - `PermissionLost` if a granted candidate cannot be resolved
    /// - `InvalidDataset` / `ValidationInconclusive` if the candidate is
    ///   unusable
    pub fn select(&self, candidate: StorageRoot) -> Result<SwitchProposal> {
        let id = AttemptId::new();
        {
            let mut slot = self.lock();
            if slot.is_some() {
                return Err(ExError::from(PantryError::SwitchInFlight).with_op("switch_select"));
            }
            *slot = Some(Attempt {
                id: id.clone(),
                state: SwitchState::CandidateSelected,
            });
        }

        let start = Instant::now();
        log_op_start!("switch_select", attempt_id = %id, candidate = %candidate);

        match self.classify_candidate(&id, candidate) {
            Ok(proposal) => {
                log_op_end!(
                    "switch_select",
                    duration_ms = start.elapsed().as_millis() as u64,
                    attempt_id = %id
                );
                Ok(proposal)
            }
            Err(e) => {
                let e = e.with_attempt_id(id.clone());
                log_op_error!(
                    "switch_select",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    attempt_id = %id
                );
                self.finish(&id, SwitchState::Rejected);
                Err(e)
            }
        }
    }

    fn classify_candidate(&self, id: &AttemptId, candidate: StorageRoot) -> Result<SwitchProposal> {
        let active = self.locator.resolve_active_root();
        let candidate_path = self.locator.resolve_root(&candidate)?;
        if candidate == active.root || candidate_path == active.path {
            return Err(ExError::from(PantryError::AlreadyActive {
                root: candidate.to_string(),
            })
            .with_op("switch_select"));
        }

        let class = self.validator.classify(&candidate_path);
        self.transition(id, SwitchState::Classified(class.clone()));

        let plan = match &class {
            StorageClass::Empty => SwitchPlan::Migrate {
                from: active.root,
                from_path: active.path,
            },
            StorageClass::ValidDataset => SwitchPlan::Adopt,
            StorageClass::Invalid(_) => {
                return Err(class.rejection(&candidate_path).unwrap_or_else(|| {
                    ExError::new(ExErrorKind::InvalidDataset).with_op("switch_select")
                }))
            }
        };

        Ok(SwitchProposal {
            attempt_id: id.clone(),
            candidate,
            candidate_path,
            plan,
            _offer: OfferGuard {
                id: id.clone(),
                slot: self.attempt.clone(),
            },
        })
    }

    /// Execute an accepted proposal.
    ///
    /// Blocks for the duration of any migration; run it through a
    /// `BackgroundTask` to keep the caller responsive.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `proposal` is not the pending attempt
    /// - `DestinationNotWritable` if the migration could not start
    /// - `MigrationPolicyUnmet` if too little was copied
    /// - `Persistence` if the new root could not be recorded
    pub fn confirm(&self, proposal: SwitchProposal) -> Result<SwitchOutcome> {
        let id = proposal.attempt_id.clone();
        {
            let slot = self.lock();
            let pending = slot
                .as_ref()
                .is_some_and(|a| a.id == id && matches!(a.state, SwitchState::Classified(_)));
            if !pending {
                return Err(ExError::new(ExErrorKind::InvalidInput)
                    .with_op("switch_confirm")
                    .with_attempt_id(id)
                    .with_message("proposal is not the pending switch attempt"));
            }
        }

        let start = Instant::now();
        log_op_start!("switch_confirm", attempt_id = %id, candidate = %proposal.candidate);

        match self.execute(&proposal) {
            Ok(outcome) => {
                self.finish(&id, SwitchState::Committed);
                log_op_end!(
                    "switch_confirm",
                    duration_ms = start.elapsed().as_millis() as u64,
                    attempt_id = %id,
                    root = %outcome.root
                );
                Ok(outcome)
            }
            Err(e) => {
                let e = e.with_attempt_id(id.clone());
                self.finish(&id, SwitchState::Failed);
                log_op_error!(
                    "switch_confirm",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    attempt_id = %id
                );
                Err(e)
            }
        }
    }

    fn execute(&self, proposal: &SwitchProposal) -> Result<SwitchOutcome> {
        let id = &proposal.attempt_id;
        let mode = match &proposal.plan {
            SwitchPlan::Migrate { from_path, .. } => {
                self.transition(id, SwitchState::Migrating);
                if self.validator.classify(&proposal.candidate_path) != StorageClass::Empty {
                    return Err(ExError::from(PantryError::InvalidDataset {
                        root: proposal.candidate.to_string(),
                        reason: "candidate is no longer empty".to_string(),
                    })
                    .with_op("switch_confirm"));
                }
                // Verified empty above; a failed attempt may wipe what it wrote.
                let migrated = self
                    .migrate_checked(from_path, proposal)
                    .and_then(|report| self.commit(proposal).map(|()| report));
                match migrated {
                    Ok(report) => SwitchMode::Migrated(report),
                    Err(e) => {
                        self.discard_partial(proposal);
                        return Err(e);
                    }
                }
            }
            SwitchPlan::Adopt => {
                self.transition(id, SwitchState::SwitchingDirect);
                self.commit(proposal)?;
                SwitchMode::Adopted
            }
        };

        Ok(SwitchOutcome {
            attempt_id: id.clone(),
            root: proposal.candidate.clone(),
            path: proposal.candidate_path.clone(),
            mode,
        })
    }

    fn migrate_checked(&self, from_path: &Path, proposal: &SwitchProposal) -> Result<MigrationReport> {
        let report = self.migrator.migrate(from_path, &proposal.candidate_path)?;
        if let PolicyDecision::Reject { reason } = self.policy.evaluate(&report) {
            return Err(ExError::from(PantryError::MigrationPolicyUnmet { reason })
                .with_op("switch_confirm")
                .with_entity(proposal.candidate.to_string()));
        }
        Ok(report)
    }

    fn discard_partial(&self, proposal: &SwitchProposal) {
        if let Err(e) = self.migrator.discard(&proposal.candidate_path) {
            log_degraded!(
                "switch_confirm",
                e.code(),
                attempt_id = %proposal.attempt_id,
                candidate = %proposal.candidate,
                reason = %e
            );
        }
    }

    fn commit(&self, proposal: &SwitchProposal) -> Result<()> {
        self.locator.persist(&proposal.candidate).map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("switch_commit")
                .with_entity(proposal.candidate.to_string())
                .with_message("could not record the new data directory")
                .with_source(e)
        })?;
        self.publisher.publish(ChangeEvent::DirectoryChanged {
            root: proposal.candidate.clone(),
            path: proposal.candidate_path.clone(),
        });
        tracing::info!(
            attempt_id = %proposal.attempt_id,
            root = %proposal.candidate,
            "Data directory switched"
        );
        Ok(())
    }

    /// Drop a proposal the user declined. Returns false if it was not the
    /// pending attempt.
    pub fn cancel(&self, proposal: &SwitchProposal) -> bool {
        let id = &proposal.attempt_id;
        let pending = self
            .lock()
            .as_ref()
            .is_some_and(|a| &a.id == id && matches!(a.state, SwitchState::Classified(_)));
        if pending {
            tracing::info!(attempt_id = %id, "Switch declined");
            self.finish(id, SwitchState::Idle);
        }
        pending
    }
}
