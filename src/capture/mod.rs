//! Scan capture boundary
//!
//! Camera-style acquisition modeled as a one-shot request that either
//! yields a live handle or fails with a caller-visible error. The
//! default source reads already-decoded codes line by line (stdin or a
//! file), standing in for a hardware scanner feeding the same lookup
//! path. No timeout is imposed on acquisition or reads.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use crate::errors::CaptureError;

/// Live capture handle yielding decoded code strings.
pub struct CaptureHandle {
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    source_name: String,
}

impl CaptureHandle {
    pub fn new(reader: Box<dyn AsyncBufRead + Unpin + Send>, source_name: String) -> Self {
        Self {
            reader,
            source_name,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Next decoded code, or `None` once the source is exhausted.
    /// Blank lines are skipped; codes are returned trimmed but otherwise
    /// untouched (normalization happens at lookup).
    pub async fn next_code(&mut self) -> Option<String> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line).await {
                Ok(0) => return None,
                Ok(_) => {
                    let code = line.trim();
                    if !code.is_empty() {
                        return Some(code.to_string());
                    }
                }
                Err(_) => return None,
            }
        }
    }
}

/// One-shot acquisition of a capture source.
#[async_trait]
pub trait CaptureSource {
    async fn acquire(&mut self) -> Result<CaptureHandle, CaptureError>;
}

/// Line-oriented capture source over stdin or a file of decoded codes.
pub enum LineCaptureSource {
    Stdin,
    File(std::path::PathBuf),
}

#[async_trait]
impl CaptureSource for LineCaptureSource {
    async fn acquire(&mut self) -> Result<CaptureHandle, CaptureError> {
        match self {
            Self::Stdin => {
                info!("Acquired scan capture from stdin");
                Ok(CaptureHandle::new(
                    Box::new(BufReader::new(tokio::io::stdin())),
                    "stdin".to_string(),
                ))
            }
            Self::File(path) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    CaptureError::acquisition_failed(format!(
                        "cannot open scan source {:?}: {}",
                        path, e
                    ))
                })?;
                info!("Acquired scan capture from {:?}", path);
                Ok(CaptureHandle::new(
                    Box::new(BufReader::new(file)),
                    path.to_string_lossy().into_owned(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_yields_trimmed_codes_and_skips_blanks() {
        let feed: &[u8] = b"  TC-1001 \n\n   \nTC-1002\n";
        let mut handle = CaptureHandle::new(Box::new(BufReader::new(feed)), "test".to_string());
        assert_eq!(handle.next_code().await.as_deref(), Some("TC-1001"));
        assert_eq!(handle.next_code().await.as_deref(), Some("TC-1002"));
        assert_eq!(handle.next_code().await, None);
    }

    #[tokio::test]
    async fn missing_file_fails_acquisition() {
        let mut source = LineCaptureSource::File("/nonexistent/scanner-feed".into());
        let result = source.acquire().await;
        assert!(matches!(result, Err(CaptureError::AcquisitionFailed { .. })));
    }
}
