use shared::{domain::SlotId, error::ErrorCode};
use thiserror::Error;

pub const VALIDATION_ERROR_MESSAGE: &str = "Please select both images";
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred while combining images";

/// Why a combine submission failed. Every variant is terminal for that
/// submission; nothing here is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("missing image for {}", format_slots(missing))]
    Validation { missing: Vec<SlotId> },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("combine endpoint returned HTTP {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Server {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed combine result: {0}")]
    MalformedResult(String),
}

fn format_slots(slots: &[SlotId]) -> String {
    slots
        .iter()
        .map(|slot| slot.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CombineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CombineError::Validation { .. } => ErrorCode::Validation,
            CombineError::Transport(_) => ErrorCode::Transport,
            CombineError::Server { .. } => ErrorCode::Server,
            CombineError::MalformedResult(_) => ErrorCode::MalformedResult,
        }
    }

    /// The single banner text shown for this failure.
    pub fn user_message(&self) -> String {
        match self {
            CombineError::Validation { .. } => VALIDATION_ERROR_MESSAGE.to_string(),
            CombineError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            CombineError::Server { message: None, .. }
            | CombineError::Transport(_)
            | CombineError::MalformedResult(_) => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for CombineError {
    fn from(err: reqwest::Error) -> Self {
        CombineError::Transport(err.to_string())
    }
}
