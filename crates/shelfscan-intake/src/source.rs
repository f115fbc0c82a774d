use std::future::Future;

use shelfscan_core::FieldExtraction;

use crate::error::IntakeError;
use crate::types::CapturedImage;

/// Anything that can turn one captured image into one extraction pass.
///
/// [`crate::OcrClient`] is the production implementation; tests script their
/// own. Implementations return an already-normalized [`FieldExtraction`].
pub trait ExtractionSource {
    /// Runs one extraction pass over `image`.
    ///
    /// # Errors
    ///
    /// Returns an [`IntakeError`] when the image could not be processed at
    /// all. The session driver records the failure and moves on.
    fn extract(
        &self,
        image: &CapturedImage,
    ) -> impl Future<Output = Result<FieldExtraction, IntakeError>> + Send;
}
