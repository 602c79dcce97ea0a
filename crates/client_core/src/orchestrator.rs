use shared::{domain::SubmissionId, protocol::ResultSet};
use tokio::sync::Mutex;

use crate::{
    error::CombineError,
    slots::UploadSlots,
    submission::{BeginOutcome, CombineTicket, SubmissionState},
    transport::CombineService,
};

/// Result of one combine exchange, tagged with the submission it belongs to.
#[derive(Debug, Clone)]
pub struct CombineCompletion {
    pub id: SubmissionId,
    pub outcome: Result<ResultSet, CombineError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight; nothing was sent.
    AlreadyInFlight,
    /// A slot was empty; the state now holds the validation failure.
    Rejected(CombineError),
    /// The response was applied to the state.
    Applied(SubmissionId),
    /// The submission was abandoned before its response arrived.
    Discarded(SubmissionId),
}

/// Drives one network exchange per submit. Holds no submission state of its
/// own; callers pass in the state they own.
pub struct CombineOrchestrator<S> {
    service: S,
}

impl<S: CombineService> CombineOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Runs the exchange for an already started submission.
    pub async fn run(&self, ticket: CombineTicket) -> CombineCompletion {
        let outcome = self.service.combine(&ticket.image1, &ticket.image2).await;
        CombineCompletion {
            id: ticket.id,
            outcome,
        }
    }

    /// Begins a submission against `state`, performs the request, and applies
    /// the outcome. The lock is not held across the network call, so a
    /// concurrent submit observes the in-flight phase and does nothing.
    pub async fn submit(&self, state: &Mutex<SubmissionState>, slots: &UploadSlots) -> SubmitOutcome {
        let ticket = match state.lock().await.begin(slots) {
            BeginOutcome::Started(ticket) => ticket,
            BeginOutcome::AlreadyInFlight(_) => return SubmitOutcome::AlreadyInFlight,
            BeginOutcome::Rejected(error) => return SubmitOutcome::Rejected(error),
        };

        let completion = self.run(ticket).await;
        let id = completion.id;
        if state.lock().await.resolve(id, completion.outcome) {
            SubmitOutcome::Applied(id)
        } else {
            SubmitOutcome::Discarded(id)
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
