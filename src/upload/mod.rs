//! Upload Module - Document Submission with Lock/Retry
//!
//! The document path of the product: submit a financial statement for leak
//! analysis, detect the "locked" response for password-protected files, and
//! resubmit once with the transport-encrypted password while reusing the
//! original file bytes.

pub mod api;
pub mod controller;

// Re-export commonly used types
pub use api::{AnalysisApiClient, AnalysisApiError, AnalysisReport, AnalysisSummary, FinancialLeak, UploadDocument};
pub use controller::{UploadFlowError, UploadRetryController, UploadState};
