//! Transcript acquisition
//!
//! Turns inline text and/or an uploaded plain-text file into one transcript
//! string. Uploads are streamed into a temporary file with a byte ceiling and
//! the file is removed as soon as it has been read.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

pub const TRANSCRIPT_REQUIRED_MESSAGE: &str = "Transcript is required (file or text).";
pub const UNSUPPORTED_ATTACHMENT_MESSAGE: &str = "Only .txt files allowed";

const ACCEPTED_MEDIA_TYPE: &str = "text/plain";
const ACCEPTED_SUFFIX: &str = ".txt";

/// Whether an attachment is declared as plain text.
///
/// Either the media type is `text/plain` (parameters ignored) or the file
/// name ends in `.txt`, case-insensitively.
pub fn is_plain_text(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let declared_text = content_type
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(ACCEPTED_MEDIA_TYPE))
        .unwrap_or(false);

    let text_suffix = file_name
        .map(|name| name.to_lowercase().ends_with(ACCEPTED_SUFFIX))
        .unwrap_or(false);

    declared_text || text_suffix
}

pub fn ensure_plain_text(content_type: Option<&str>, file_name: Option<&str>) -> Result<()> {
    if is_plain_text(content_type, file_name) {
        Ok(())
    } else {
        Err(AppError::UnsupportedAttachment(
            UNSUPPORTED_ATTACHMENT_MESSAGE.to_string(),
        ))
    }
}

/// Pick the transcript text. File content wins over inline text.
pub fn resolve_transcript(inline: Option<&str>, file_text: Option<&str>) -> Result<String> {
    let transcript = file_text.or(inline).map(str::trim).unwrap_or_default();

    if transcript.is_empty() {
        return Err(AppError::Validation(TRANSCRIPT_REQUIRED_MESSAGE.to_string()));
    }

    Ok(transcript.to_string())
}

/// Read the staged upload if any, then resolve against the inline text.
pub async fn acquire_transcript(
    inline: Option<&str>,
    upload: Option<StagedUpload>,
) -> Result<String> {
    let file_text = match upload {
        Some(upload) => Some(upload.read_to_string().await?),
        None => None,
    };

    resolve_transcript(inline, file_text.as_deref())
}

/// Streams uploads into temporary files under a byte ceiling.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: Option<PathBuf>,
    max_bytes: usize,
}

impl UploadStager {
    pub fn new(dir: Option<PathBuf>, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn create_temp_file(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("meetnotes-upload-").suffix(ACCEPTED_SUFFIX);

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    /// Write `chunks` to a new temporary file.
    ///
    /// Fails with [`AppError::PayloadTooLarge`] as soon as the ceiling is
    /// crossed. The partial file is removed on every error path.
    pub async fn stage<S, E>(&self, file_name: Option<String>, mut chunks: S) -> Result<StagedUpload>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
        E: Into<AppError>,
    {
        let temp = self.create_temp_file()?;
        let mut staged = StagedUpload {
            file: temp,
            file_name,
            size: 0,
        };

        let mut writer = match staged.file.reopen() {
            Ok(file) => tokio::fs::File::from_std(file),
            Err(e) => {
                staged.discard();
                return Err(e.into());
            }
        };

        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(writer);
                    staged.discard();
                    return Err(e.into());
                }
            };

            staged.size += chunk.len();
            if staged.size > self.max_bytes {
                drop(writer);
                tracing::info!(
                    limit = self.max_bytes,
                    file_name = ?staged.file_name,
                    "Rejected upload over size ceiling"
                );
                staged.discard();
                return Err(AppError::PayloadTooLarge(format!(
                    "File too large (max {} bytes).",
                    self.max_bytes
                )));
            }

            if let Err(e) = writer.write_all(&chunk).await {
                drop(writer);
                staged.discard();
                return Err(e.into());
            }
        }

        if let Err(e) = writer.flush().await {
            drop(writer);
            staged.discard();
            return Err(e.into());
        }

        Ok(staged)
    }
}

/// An upload held in a temporary file for the lifetime of one request.
///
/// Dropping it also removes the file, but silently. Prefer
/// [`StagedUpload::read_to_string`] or [`StagedUpload::discard`], which log
/// cleanup failures.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    file_name: Option<String>,
    size: usize,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Read the file as UTF-8 (invalid sequences replaced) and delete it,
    /// whether or not the read succeeded.
    pub async fn read_to_string(self) -> Result<String> {
        let read = tokio::fs::read(self.path()).await;
        self.discard();

        let bytes = read?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Delete the file now. Failures are logged, never returned.
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}
