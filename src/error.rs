//! Error kinds the core distinguishes at its boundaries.
//!
//! Page-local and asset-local failures are isolated inside their respective
//! modules (logged via `log::warn!`, the affected page/asset is skipped) and
//! never reach these variants. Only structural PDF failures and the
//! empty-result case propagate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Upload is not a PDF (400-class at the upload boundary).
    #[error("only PDF files are accepted: {0}")]
    IngestFormat(String),

    /// The PDF page access library failed to open or parse the document
    /// (500-class at the upload boundary, carrying the adapter's message).
    #[error("PDF read error: {0}")]
    IngestRead(String),

    /// The extractor produced an empty sequence (422-class at the upload
    /// boundary).
    #[error(
        "No MCQ questions detected. Ensure the PDF contains standard question \
         numbering (1. / Q1 / Q.1 / Question 1 / Que 1 / I. II. III. …) and \
         option labels (A) B) C) D) or (A) a. • etc)."
    )]
    NoQuestions,
}
