//! Named, single-occupancy document slots with type and size checks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::UploadedFile;

const DOCUMENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "application/pdf"];
const SIGNATURE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

/// Which files a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptPolicy {
    allowed: &'static [&'static str],
    expected: &'static str,
    max_bytes: Option<u64>,
}

impl AcceptPolicy {
    /// Application documents: JPG, PNG or PDF.
    pub fn documents(max_bytes: Option<u64>) -> Self {
        Self {
            allowed: DOCUMENT_TYPES,
            expected: "an image (JPG, PNG) or PDF file",
            max_bytes,
        }
    }

    /// Uploaded signatures: images only.
    pub fn signature_images(max_bytes: Option<u64>) -> Self {
        Self {
            allowed: SIGNATURE_TYPES,
            expected: "an image file (JPG, PNG)",
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    pub fn check(&self, file: &UploadedFile) -> Result<(), AttachmentError> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if !self.allowed.contains(&mime.as_str()) {
            return Err(AttachmentError::UnsupportedFileType {
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
                expected: self.expected,
            });
        }
        if let Some(max) = self.max_bytes {
            if file.size() > max {
                return Err(AttachmentError::FileTooLarge {
                    file_name: file.file_name.clone(),
                    size: file.size(),
                    max,
                });
            }
        }
        Ok(())
    }
}

/// User-visible rejection of a picked or dropped file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("Please upload {expected} only ('{file_name}' is {mime_type})")]
    UnsupportedFileType {
        file_name: String,
        mime_type: String,
        expected: &'static str,
    },
    #[error("'{file_name}' is {} MB; the limit is {} MB", megabytes(.size), megabytes(.max))]
    FileTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },
}

fn megabytes(bytes: &u64) -> String {
    format!("{:.2}", *bytes as f64 / 1024.0 / 1024.0)
}

/// The optional documents collected on the last application step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentSlot {
    #[serde(rename = "result_card_1")]
    ResultCard1,
    #[serde(rename = "result_card_2")]
    ResultCard2,
    #[serde(rename = "cnic")]
    Cnic,
    #[serde(rename = "certificate")]
    Certificate,
    #[serde(rename = "passport")]
    Passport,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 5] = [
        DocumentSlot::ResultCard1,
        DocumentSlot::ResultCard2,
        DocumentSlot::Cnic,
        DocumentSlot::Certificate,
        DocumentSlot::Passport,
    ];

    /// Multipart field name.
    pub const fn field_name(self) -> &'static str {
        match self {
            DocumentSlot::ResultCard1 => "result_card_1",
            DocumentSlot::ResultCard2 => "result_card_2",
            DocumentSlot::Cnic => "cnic",
            DocumentSlot::Certificate => "certificate",
            DocumentSlot::Passport => "passport",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DocumentSlot::ResultCard1 => "Result Card (10th/Matric)",
            DocumentSlot::ResultCard2 => "Result Card (12th/Intermediate)",
            DocumentSlot::Cnic => "CNIC / National ID",
            DocumentSlot::Certificate => "Certificate (if any)",
            DocumentSlot::Passport => "Passport (if available)",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.field_name() == name)
    }
}

/// Drag-and-drop events targeting one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    /// Only the first dropped file is considered.
    Drop(Vec<UploadedFile>),
}

#[derive(Debug, Clone)]
pub struct FileAttachmentSet {
    policy: AcceptPolicy,
    files: BTreeMap<DocumentSlot, UploadedFile>,
    drag_active: BTreeSet<DocumentSlot>,
}

impl FileAttachmentSet {
    pub fn new(policy: AcceptPolicy) -> Self {
        Self {
            policy,
            files: BTreeMap::new(),
            drag_active: BTreeSet::new(),
        }
    }

    pub fn policy(&self) -> &AcceptPolicy {
        &self.policy
    }

    /// Stores `file` in `slot`, replacing any previous file. A rejected file
    /// leaves the slot untouched.
    pub fn attach(&mut self, slot: DocumentSlot, file: UploadedFile) -> Result<(), AttachmentError> {
        if let Err(err) = self.policy.check(&file) {
            warn!(slot = slot.field_name(), error = %err, "attachment rejected");
            return Err(err);
        }
        self.files.insert(slot, file);
        Ok(())
    }

    /// Clears `slot`, returning what was there.
    pub fn detach(&mut self, slot: DocumentSlot) -> Option<UploadedFile> {
        self.files.remove(&slot)
    }

    pub fn get(&self, slot: DocumentSlot) -> Option<&UploadedFile> {
        self.files.get(&slot)
    }

    /// Attached files in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (DocumentSlot, &UploadedFile)> {
        self.files.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Browse and drop both end in [`FileAttachmentSet::attach`]; drag state
    /// only drives highlighting and is reset by a drop.
    pub fn handle_drag(
        &mut self,
        slot: DocumentSlot,
        event: DragEvent,
    ) -> Result<(), AttachmentError> {
        match event {
            DragEvent::Enter | DragEvent::Over => {
                self.drag_active.insert(slot);
                Ok(())
            }
            DragEvent::Leave => {
                self.drag_active.remove(&slot);
                Ok(())
            }
            DragEvent::Drop(files) => {
                self.drag_active.remove(&slot);
                match files.into_iter().next() {
                    Some(file) => self.attach(slot, file),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn is_drag_active_for(&self, slot: DocumentSlot) -> bool {
        self.drag_active.contains(&slot)
    }
}
