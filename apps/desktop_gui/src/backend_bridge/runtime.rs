//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread};

use client_core::{ClientConfig, CombineOrchestrator, HttpCombineService, SlotFile};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::{SlotId, SubmissionId};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
    media::decode_preview_image,
};

pub fn launch(config: ClientConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                startup_failure(&ui_tx, format!("failed to build runtime: {err}"));
                return;
            }
        };

        let service = match HttpCombineService::new(&config) {
            Ok(service) => service,
            Err(err) => {
                startup_failure(&ui_tx, format!("failed to build HTTP client: {err:#}"));
                return;
            }
        };
        tracing::info!(endpoint = %service.endpoint(), "backend worker ready");
        let orchestrator = Arc::new(CombineOrchestrator::new(service));
        let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let ui_tx = ui_tx.clone();
                match cmd {
                    BackendCommand::LoadSlotFile {
                        slot,
                        request,
                        path,
                    } => {
                        tokio::spawn(load_slot_file(slot, request, path, ui_tx));
                    }
                    BackendCommand::Combine(ticket) => {
                        let orchestrator = Arc::clone(&orchestrator);
                        tokio::spawn(async move {
                            let completion = orchestrator.run(ticket).await;
                            send_event(&ui_tx, UiEvent::CombineFinished(completion));
                        });
                    }
                    BackendCommand::FetchResultImage {
                        submission_id,
                        key,
                        url,
                    } => {
                        let orchestrator = Arc::clone(&orchestrator);
                        tokio::spawn(async move {
                            let event =
                                fetch_result_image(&orchestrator, submission_id, key, url).await;
                            send_event(&ui_tx, event);
                        });
                    }
                }
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    });
}

fn startup_failure(ui_tx: &Sender<UiEvent>, detail: String) {
    tracing::error!("backend worker startup failure: {detail}");
    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
        UiErrorContext::BackendStartup,
        format!("backend worker startup failure: {detail}"),
    )));
}

fn send_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if let Err(err) = ui_tx.try_send(event) {
        tracing::warn!("dropping backend->ui event: {err}");
    }
}

async fn load_slot_file(slot: SlotId, request: u64, path: PathBuf, ui_tx: Sender<UiEvent>) {
    let file = match SlotFile::read_from_path(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(slot = %slot.label(), path = %path.display(), "failed to read file: {err:#}");
            send_event(
                &ui_tx,
                UiEvent::SlotFileFailed {
                    slot,
                    request,
                    path,
                    reason: format!("{err:#}"),
                },
            );
            return;
        }
    };

    let bytes = file.shared_bytes();
    let preview = tokio::task::spawn_blocking(move || decode_preview_image(&bytes))
        .await
        .unwrap_or_else(|err| Err(format!("preview decode task failed: {err}")));
    send_event(
        &ui_tx,
        UiEvent::SlotFileLoaded {
            slot,
            request,
            file,
            preview,
        },
    );
}

async fn fetch_result_image(
    orchestrator: &CombineOrchestrator<HttpCombineService>,
    submission_id: SubmissionId,
    key: String,
    url: String,
) -> UiEvent {
    let bytes = match orchestrator.service().fetch_result_image(&url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return UiEvent::ResultImageFailed {
                submission_id,
                key,
                url,
                reason: format!("{err:#}"),
            }
        }
    };

    let decoded = {
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || decode_preview_image(&bytes))
            .await
            .unwrap_or_else(|err| Err(format!("decode task failed: {err}")))
    };
    match decoded {
        Ok(image) => UiEvent::ResultImageLoaded {
            submission_id,
            key,
            image,
            original_bytes: bytes,
        },
        Err(reason) => UiEvent::ResultImageFailed {
            submission_id,
            key,
            url,
            reason,
        },
    }
}
