//! UI/backend events and error modeling for the desktop shell.

use std::path::PathBuf;

use client_core::{CombineCompletion, CombineError, SlotFile};
use shared::{
    domain::{SlotId, SubmissionId},
    error::ErrorCode,
};

use crate::media::PreviewImage;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    SlotFileLoaded {
        slot: SlotId,
        request: u64,
        file: SlotFile,
        preview: Result<PreviewImage, String>,
    },
    SlotFileFailed {
        slot: SlotId,
        request: u64,
        path: PathBuf,
        reason: String,
    },
    CombineFinished(CombineCompletion),
    ResultImageLoaded {
        submission_id: SubmissionId,
        key: String,
        image: PreviewImage,
        original_bytes: Vec<u8>,
    },
    ResultImageFailed {
        submission_id: SubmissionId,
        key: String,
        url: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadImage,
    Combine,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("not a readable image")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_combine(error: &CombineError) -> Self {
        let category = match error.code() {
            ErrorCode::Validation => UiErrorCategory::Validation,
            ErrorCode::Transport => UiErrorCategory::Transport,
            ErrorCode::Server | ErrorCode::MalformedResult => UiErrorCategory::Server,
        };
        Self {
            category,
            context: UiErrorContext::Combine,
            message: error.user_message(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn context_label(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::BackendStartup => "Backend startup",
        UiErrorContext::LoadImage => "Loading image",
        UiErrorContext::Combine => "Combine",
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
