//! Core of the image combiner client: upload slots, the combine submission
//! state machine, the HTTP transport, and the result card model.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod results;
pub mod slots;
pub mod submission;
pub mod transport;

pub use config::{load_client_config, ClientConfig};
pub use error::{CombineError, FALLBACK_ERROR_MESSAGE, VALIDATION_ERROR_MESSAGE};
pub use orchestrator::{CombineCompletion, CombineOrchestrator, SubmitOutcome};
pub use results::{display_label, result_cards, visible_cards, ImageLoadState, ResultCard};
pub use shared::{
    domain::{SlotId, SubmissionId},
    protocol::{ResultEntry, ResultSet},
};
pub use slots::{is_image_filename, SlotFile, UploadSlot, UploadSlots, IMAGE_EXTENSIONS};
pub use submission::{BeginOutcome, CombineTicket, Phase, SubmissionState};
pub use transport::{interpret_response, CombineService, HttpCombineService};
