//! PDF ingestion: text extraction plus object storage for the original file.
//!
//! Extracted text is the only thing the analysis pipeline ever reads; the
//! original bytes are kept in S3 for download and audit.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// 10 MB cap on uploaded PDFs.
pub const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

pub struct IngestedPdf {
    pub key: String,
    pub text: String,
}

/// Extracts text from an uploaded PDF and stores the original bytes under
/// `prefix/` in the bucket. Rejects oversized files, non-PDF payloads, and
/// documents with no extractable text.
pub async fn ingest_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    filename: &str,
    bytes: Bytes,
) -> Result<IngestedPdf, AppError> {
    validate_pdf_bytes(&bytes)?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| AppError::Validation(format!("Failed to extract text from PDF: {e}")))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "PDF contains no extractable text".to_string(),
        ));
    }

    let key = format!("{prefix}/{}_{filename}", Uuid::new_v4());
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("S3 upload failed: {e}")))?;

    info!("Stored uploaded PDF at s3://{bucket}/{key}");

    Ok(IngestedPdf { key, text })
}

fn validate_pdf_bytes(bytes: &[u8]) -> Result<(), AppError> {
    if bytes.len() > MAX_PDF_BYTES {
        return Err(AppError::Validation(format!(
            "PDF exceeds the {MAX_PDF_BYTES} byte upload limit"
        )));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(AppError::Validation("File is not a PDF".to_string()));
    }
    Ok(())
}

/// Maps a multipart decoding failure to a validation error.
pub fn bad_upload(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid multipart payload: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_payload_is_rejected() {
        let err = validate_pdf_bytes(b"plain text resume").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let mut bytes = b"%PDF-1.7".to_vec();
        bytes.resize(MAX_PDF_BYTES + 1, 0);
        let err = validate_pdf_bytes(&bytes).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_pdf_magic_passes_validation() {
        assert!(validate_pdf_bytes(b"%PDF-1.4 rest of file").is_ok());
    }
}
