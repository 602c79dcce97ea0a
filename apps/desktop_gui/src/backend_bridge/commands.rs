//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::CombineTicket;
use shared::domain::{SlotId, SubmissionId};

pub enum BackendCommand {
    LoadSlotFile {
        slot: SlotId,
        request: u64,
        path: PathBuf,
    },
    Combine(CombineTicket),
    FetchResultImage {
        submission_id: SubmissionId,
        key: String,
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadSlotFile { .. } => "load_slot_file",
            BackendCommand::Combine(_) => "combine",
            BackendCommand::FetchResultImage { .. } => "fetch_result_image",
        }
    }
}
