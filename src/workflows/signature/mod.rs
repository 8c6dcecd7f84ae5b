//! Signature capture: a freehand drawing or an uploaded image, never both.

pub mod input;
pub mod surface;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attachments::{AcceptPolicy, AttachmentError};
use crate::api::UploadedFile;

pub use input::{Point, PointerInput, Stroke, StrokeRecorder, SurfaceBounds};
pub use surface::{RasterSurface, Surface, SurfaceError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMethod {
    #[default]
    Draw,
    Upload,
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Please provide your signature")]
    EmptySignature,
    #[error("switch to upload mode before attaching a signature file")]
    UploadRequiresUploadMode,
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug)]
pub struct SignatureCapture {
    method: SignatureMethod,
    recorder: StrokeRecorder,
    surface: Box<dyn Surface>,
    uploaded: Option<UploadedFile>,
    upload_policy: AcceptPolicy,
}

impl SignatureCapture {
    pub fn new(surface: Box<dyn Surface>, upload_policy: AcceptPolicy) -> Self {
        Self {
            method: SignatureMethod::Draw,
            recorder: StrokeRecorder::default(),
            surface,
            uploaded: None,
            upload_policy,
        }
    }

    /// Default raster surface with the image-only upload policy.
    pub fn with_upload_limit(max_upload_bytes: Option<u64>) -> Self {
        Self::new(
            Box::new(RasterSurface::default()),
            AcceptPolicy::signature_images(max_upload_bytes),
        )
    }

    pub fn method(&self) -> SignatureMethod {
        self.method
    }

    /// Switching method discards whatever the other method captured.
    pub fn set_method(&mut self, method: SignatureMethod) {
        if self.method != method {
            debug!(from = ?self.method, to = ?method, "signature method switched");
            self.method = method;
            self.clear();
        }
    }

    pub fn pointer_down(&mut self, input: &PointerInput, bounds: SurfaceBounds) -> bool {
        match (self.method, input.to_local(bounds)) {
            (SignatureMethod::Draw, Some(point)) => {
                self.recorder.begin_stroke(point);
                true
            }
            _ => false,
        }
    }

    pub fn pointer_move(&mut self, input: &PointerInput, bounds: SurfaceBounds) -> bool {
        match (self.method, input.to_local(bounds)) {
            (SignatureMethod::Draw, Some(point)) => self.recorder.extend_stroke(point),
            _ => false,
        }
    }

    /// Pointer release or the pointer leaving the surface.
    pub fn pointer_up(&mut self) {
        self.recorder.end_stroke();
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.method == SignatureMethod::Draw {
            self.recorder.begin_stroke(point);
        }
    }

    pub fn extend_stroke(&mut self, point: Point) -> bool {
        self.method == SignatureMethod::Draw && self.recorder.extend_stroke(point)
    }

    pub fn end_stroke(&mut self) {
        self.recorder.end_stroke();
    }

    /// Replays complete strokes, e.g. ones captured by another client.
    pub fn replay(&mut self, strokes: &[Vec<Point>]) {
        for points in strokes {
            let mut iter = points.iter().copied();
            if let Some(first) = iter.next() {
                self.begin_stroke(first);
                for point in iter {
                    self.extend_stroke(point);
                }
                self.end_stroke();
            }
        }
    }

    pub fn has_drawn_signature(&self) -> bool {
        self.recorder.has_content()
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.recorder.strokes()
    }

    pub fn attach_upload(&mut self, file: UploadedFile) -> Result<(), SignatureError> {
        if self.method != SignatureMethod::Upload {
            return Err(SignatureError::UploadRequiresUploadMode);
        }
        self.upload_policy.check(&file)?;
        self.uploaded = Some(file);
        Ok(())
    }

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.uploaded.as_ref()
    }

    /// Blanks the drawing and drops any uploaded file, whatever the mode.
    pub fn clear(&mut self) {
        self.recorder.clear();
        self.uploaded = None;
    }

    pub fn has_content(&self) -> bool {
        match self.method {
            SignatureMethod::Draw => self.recorder.has_content(),
            SignatureMethod::Upload => self.uploaded.is_some(),
        }
    }

    /// Produces the file sent as `signature`: the rendered drawing as
    /// `signature.png`, or the upload renamed to `signature.<ext>`.
    pub fn export(&self) -> Result<UploadedFile, SignatureError> {
        match self.method {
            SignatureMethod::Draw => {
                if !self.recorder.has_content() {
                    return Err(SignatureError::EmptySignature);
                }
                Ok(self.surface.export(self.recorder.strokes())?)
            }
            SignatureMethod::Upload => {
                let file = self
                    .uploaded
                    .as_ref()
                    .ok_or(SignatureError::EmptySignature)?;
                let extension = file
                    .extension()
                    .map(str::to_string)
                    .unwrap_or_else(|| extension_for_mime(&file.mime_type));
                Ok(file.renamed(format!("signature.{extension}")))
            }
        }
    }
}

/// Conventional extension for an image type; `jpg` when the type is unknown.
fn extension_for_mime(mime_type: &str) -> String {
    let essence = mime_type.trim().to_ascii_lowercase();
    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|extensions| {
            extensions
                .iter()
                .find(|ext| **ext == "jpg")
                .or_else(|| extensions.first())
        })
        .map_or_else(|| "jpg".to_string(), |ext| (*ext).to_string())
}
