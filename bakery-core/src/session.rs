//! Bake and verify workflows as explicit state objects.
//!
//! A front end (CLI, browser, HTTP) feeds uploads and verifier results into
//! a session and reads back what to display. Sessions never touch the
//! network themselves except through [`VerifySession::verify_with`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::bake::{bake_with_mode, extract, BakeMode, BakedImage};
use crate::document::{DocumentId, WrappedDocument};
use crate::error::{BakeryError, Result as BakeryResult};
use crate::png::has_png_signature;
use crate::verify::{is_valid, VerificationFragment, Verdict};

#[cfg(feature = "network")]
use crate::verify::{DocumentVerifier, VerifyOptions};

/// A file handed over by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Rejected upload action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,

    #[error("Only one file can be uploaded at a time (got {0})")]
    MultipleFiles(usize),
}

/// Accept exactly one file from an upload action.
pub fn single_upload(files: Vec<Upload>) -> std::result::Result<Upload, UploadError> {
    let count = files.len();
    let mut files = files.into_iter();
    match (files.next(), count) {
        (None, _) => Err(UploadError::NoFile),
        (Some(file), 1) => Ok(file),
        (Some(_), n) => {
            warn!(count = n, "Rejected multiple-file upload");
            Err(UploadError::MultipleFiles(n))
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Bakery(#[from] BakeryError),

    #[error("Verification result for document {got} does not match current document {expected}")]
    StaleResult {
        expected: DocumentId,
        got: DocumentId,
    },

    #[error("Not ready: {0}")]
    NotReady(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Verification state for one document at a time.
#[derive(Debug, Clone, Default)]
pub struct VerifySession {
    document: Option<(DocumentId, WrappedDocument)>,
    fragments: Vec<VerificationFragment>,
    checked_at: Option<DateTime<Utc>>,
}

impl VerifySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `document` the current document and discard earlier results.
    pub fn load_document(&mut self, document: WrappedDocument) -> BakeryResult<&DocumentId> {
        let id = document.id()?;
        debug!(document_id = id.short(), "Loaded document for verification");
        self.fragments.clear();
        self.checked_at = None;
        Ok(&self.document.insert((id, document)).0)
    }

    /// Extract the document baked into an uploaded image and load it.
    ///
    /// On any error the session is left unchanged.
    pub fn load_baked_image(&mut self, files: Vec<Upload>) -> Result<&DocumentId> {
        let upload = single_upload(files)?;
        let document = extract(&upload.bytes)?;
        Ok(self.load_document(document)?)
    }

    pub fn document(&self) -> Option<&WrappedDocument> {
        self.document.as_ref().map(|(_, doc)| doc)
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document.as_ref().map(|(id, _)| id)
    }

    /// Record verifier results for the document identified by `document_id`.
    ///
    /// Results for any other document are rejected, so a slow response
    /// cannot overwrite the verdict of a document loaded after it was sent.
    pub fn apply_fragments(
        &mut self,
        document_id: &DocumentId,
        fragments: Vec<VerificationFragment>,
    ) -> Result<()> {
        let current = self
            .document_id()
            .ok_or(SessionError::NotReady("no document loaded"))?;
        if current != document_id {
            warn!(
                expected = current.short(),
                got = document_id.short(),
                "Discarding stale verification result"
            );
            return Err(SessionError::StaleResult {
                expected: current.clone(),
                got: document_id.clone(),
            });
        }
        self.fragments = fragments;
        self.checked_at = Some(Utc::now());
        Ok(())
    }

    pub fn fragments(&self) -> &[VerificationFragment] {
        &self.fragments
    }

    pub fn is_valid(&self) -> bool {
        is_valid(&self.fragments)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_fragments(&self.fragments)
    }

    /// When the current fragments were recorded.
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }

    /// Run `verifier` on the current document and apply the result.
    #[cfg(feature = "network")]
    pub async fn verify_with(
        &mut self,
        verifier: &dyn DocumentVerifier,
        options: &VerifyOptions,
    ) -> Result<Verdict> {
        let (id, document) = self
            .document
            .clone()
            .ok_or(SessionError::NotReady("no document loaded"))?;
        let fragments = verifier.verify(&document, options).await?;
        self.apply_fragments(&id, fragments)?;
        Ok(self.verdict())
    }
}

/// State of the bake workflow: one image, one document, one result.
#[derive(Debug, Clone, Default)]
pub struct BakeSession {
    image: Option<Upload>,
    verification: VerifySession,
    baked: Option<BakedImage>,
}

impl BakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the PNG to bake into. Non-PNG uploads are rejected without
    /// changing state.
    pub fn select_image(&mut self, files: Vec<Upload>) -> Result<()> {
        let upload = single_upload(files)?;
        if !has_png_signature(&upload.bytes) {
            return Err(BakeryError::format(format!("{} is not a PNG image", upload.name)).into());
        }
        debug!(name = %upload.name, bytes = upload.bytes.len(), "Selected image");
        self.image = Some(upload);
        self.baked = None;
        Ok(())
    }

    /// Select the document to bake. Returns its id so verifier results can
    /// be keyed to it.
    pub fn select_document(&mut self, files: Vec<Upload>) -> Result<DocumentId> {
        let upload = single_upload(files)?;
        let document = WrappedDocument::from_json_slice(&upload.bytes)?;
        debug!(name = %upload.name, format = %document.format(), "Selected document");
        let id = self.verification.load_document(document)?.clone();
        self.baked = None;
        Ok(id)
    }

    pub fn image(&self) -> Option<&Upload> {
        self.image.as_ref()
    }

    pub fn document(&self) -> Option<&WrappedDocument> {
        self.verification.document()
    }

    /// Verification state of the selected document.
    pub fn verification(&self) -> &VerifySession {
        &self.verification
    }

    pub fn verification_mut(&mut self) -> &mut VerifySession {
        &mut self.verification
    }

    pub fn can_bake(&self) -> bool {
        self.image.is_some() && self.verification.document().is_some()
    }

    pub fn bake(&mut self, mode: BakeMode) -> Result<&BakedImage> {
        let image = self
            .image
            .as_ref()
            .ok_or(SessionError::NotReady("no image selected"))?;
        let document = self
            .verification
            .document()
            .ok_or(SessionError::NotReady("no document selected"))?;
        let baked = bake_with_mode(&image.bytes, document, mode)?;
        Ok(&*self.baked.insert(baked))
    }

    pub fn baked(&self) -> Option<&BakedImage> {
        self.baked.as_ref()
    }
}
