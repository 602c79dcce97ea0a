use shared::{domain::SubmissionId, protocol::ResultSet};
use tracing::{debug, info, warn};

use crate::{
    error::CombineError,
    slots::{SlotFile, UploadSlots},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmissionPhase {
    Idle,
    InFlight(SubmissionId),
    Succeeded(ResultSet),
    Failed {
        error: CombineError,
        message: String,
    },
}

/// Everything the transport needs to run one submission.
#[derive(Debug, Clone)]
pub struct CombineTicket {
    pub id: SubmissionId,
    pub image1: SlotFile,
    pub image2: SlotFile,
}

#[derive(Debug)]
pub enum BeginOutcome {
    Started(CombineTicket),
    AlreadyInFlight(SubmissionId),
    Rejected(CombineError),
}

/// The submission state machine. Results exist only in `Succeeded`, an error
/// message only in `Failed`, and at most one submission is in flight.
#[derive(Debug, Clone)]
pub struct SubmissionState {
    phase: SubmissionPhase,
    next_id: u64,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionState {
    pub fn new() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            SubmissionPhase::Idle => Phase::Idle,
            SubmissionPhase::InFlight(_) => Phase::InFlight,
            SubmissionPhase::Succeeded(_) => Phase::Succeeded,
            SubmissionPhase::Failed { .. } => Phase::Failed,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight_id().is_some()
    }

    pub fn in_flight_id(&self) -> Option<SubmissionId> {
        match self.phase {
            SubmissionPhase::InFlight(id) => Some(id),
            _ => None,
        }
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        match &self.phase {
            SubmissionPhase::Succeeded(results) => Some(results),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CombineError> {
        match &self.phase {
            SubmissionPhase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            SubmissionPhase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether a submit trigger should be offered right now.
    pub fn can_submit(&self, slots: &UploadSlots) -> bool {
        slots.is_ready() && !self.is_in_flight()
    }

    /// Starts a submission. A request already in flight makes this a no-op;
    /// an empty slot fails the submission locally without a network call.
    pub fn begin(&mut self, slots: &UploadSlots) -> BeginOutcome {
        if let SubmissionPhase::InFlight(id) = self.phase {
            debug!(submission_id = id.0, "submit ignored; a combine request is in flight");
            return BeginOutcome::AlreadyInFlight(id);
        }

        let Some((image1, image2)) = slots.ready_pair() else {
            let error = CombineError::Validation {
                missing: slots.missing(),
            };
            warn!(%error, "submit rejected before sending");
            self.fail(error.clone());
            return BeginOutcome::Rejected(error);
        };

        let id = SubmissionId(self.next_id);
        self.next_id += 1;
        self.phase = SubmissionPhase::InFlight(id);
        info!(
            submission_id = id.0,
            image1 = image1.name(),
            image2 = image2.name(),
            "combine submission started"
        );
        BeginOutcome::Started(CombineTicket { id, image1, image2 })
    }

    /// Applies the outcome of submission `id`. Returns false, leaving the state
    /// untouched, when `id` is no longer the in-flight submission.
    pub fn resolve(&mut self, id: SubmissionId, outcome: Result<ResultSet, CombineError>) -> bool {
        if self.in_flight_id() != Some(id) {
            warn!(
                submission_id = id.0,
                current = ?self.in_flight_id(),
                "discarding stale combine response"
            );
            return false;
        }

        match outcome {
            Ok(results) => {
                info!(submission_id = id.0, results = results.len(), "combine succeeded");
                self.phase = SubmissionPhase::Succeeded(results);
            }
            Err(error) => {
                warn!(submission_id = id.0, code = ?error.code(), %error, "combine failed");
                self.fail(error);
            }
        }
        true
    }

    /// Forgets the in-flight submission so its late response is discarded.
    pub fn abandon_in_flight(&mut self) -> Option<SubmissionId> {
        let id = self.in_flight_id()?;
        info!(submission_id = id.0, "abandoning in-flight combine submission");
        self.phase = SubmissionPhase::Idle;
        Some(id)
    }

    /// Back to `Idle` from any phase. Ids keep increasing, so a response to
    /// the abandoned submission can never match a later one.
    pub fn reset(&mut self) -> Option<SubmissionId> {
        let abandoned = self.abandon_in_flight();
        self.phase = SubmissionPhase::Idle;
        abandoned
    }

    fn fail(&mut self, error: CombineError) {
        let message = error.user_message();
        self.phase = SubmissionPhase::Failed { error, message };
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
