use std::{fmt, path::Path, sync::Arc};

use anyhow::{Context, Result};
use shared::domain::SlotId;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A locally selected file. The bytes are shared read-only between the
/// preview decoder and the multipart request builder.
#[derive(Clone, PartialEq, Eq)]
pub struct SlotFile {
    name: String,
    mime_type: Option<String>,
    bytes: Arc<[u8]>,
}

impl SlotFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: Option<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub async fn read_from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image file '{}'", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image.bin")
            .to_string();
        let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn content_type(&self) -> &str {
        self.mime_type().unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SlotFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadSlot {
    id: SlotId,
    file: Option<SlotFile>,
    generation: u64,
}

impl UploadSlot {
    fn empty(id: SlotId) -> Self {
        Self {
            id,
            file: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn file(&self) -> Option<&SlotFile> {
        self.file.as_ref()
    }

    /// Bumped on every accepted selection; preview resources keyed by an older
    /// generation are stale and should be released.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_filled(&self) -> bool {
        self.file.as_ref().is_some_and(|file| !file.is_empty())
    }
}

/// The two independent upload positions.
#[derive(Debug, Clone)]
pub struct UploadSlots {
    slots: [UploadSlot; 2],
}

impl Default for UploadSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSlots {
    pub fn new() -> Self {
        Self {
            slots: [
                UploadSlot::empty(SlotId::Slot1),
                UploadSlot::empty(SlotId::Slot2),
            ],
        }
    }

    /// Last selection wins. `None` (a cancelled picker) leaves the slot as is.
    /// Returns whether the slot changed.
    pub fn select_file(&mut self, id: SlotId, file: Option<SlotFile>) -> bool {
        let Some(file) = file else {
            return false;
        };
        let slot = &mut self.slots[id.index()];
        tracing::debug!(slot = id.label(), name = file.name(), bytes = file.len(), "slot file selected");
        slot.file = Some(file);
        slot.generation = slot.generation.wrapping_add(1);
        true
    }

    pub fn slot(&self, id: SlotId) -> &UploadSlot {
        &self.slots[id.index()]
    }

    pub fn file(&self, id: SlotId) -> Option<&SlotFile> {
        self.slot(id).file()
    }

    pub fn is_ready(&self) -> bool {
        self.slots.iter().all(UploadSlot::is_filled)
    }

    pub fn missing(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|slot| !slot.is_filled())
            .map(UploadSlot::id)
            .collect()
    }

    /// Both files, if both slots are filled. Cloning shares the byte buffers.
    pub fn ready_pair(&self) -> Option<(SlotFile, SlotFile)> {
        if !self.is_ready() {
            return None;
        }
        Some((
            self.file(SlotId::Slot1)?.clone(),
            self.file(SlotId::Slot2)?.clone(),
        ))
    }
}

pub fn is_image_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "tests/slots_tests.rs"]
mod tests;
