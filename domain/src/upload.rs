//! Validation and on-disk storage of uploaded meeting audio.

use crate::error::{Error, UploadErrorKind};
use log::*;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Audio container formats the transcription provider accepts.
pub const ALLOWED_EXTENSIONS: [&str; 8] = ["mp3", "wav", "m4a", "ogg", "webm", "flac", "aac", "mp4"];

/// Lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| !ext.is_empty())
}

/// Checks an upload before it is written, returning its normalized extension.
pub fn validate(filename: &str, size_bytes: u64, max_bytes: u64) -> Result<String, Error> {
    let extension = extension_of(filename).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        warn!("Rejected upload {filename:?} with unsupported extension");
        return Err(Error::upload(UploadErrorKind::UnsupportedType(
            if extension.is_empty() {
                "(none)".to_string()
            } else {
                extension
            },
        )));
    }
    if size_bytes == 0 {
        return Err(Error::upload(UploadErrorKind::Empty));
    }
    if size_bytes > max_bytes {
        warn!("Rejected upload {filename:?} of {size_bytes} bytes");
        return Err(Error::upload(UploadErrorKind::TooLarge { max_bytes }));
    }
    Ok(extension)
}

/// Writes `bytes` to a fresh `{uuid}.{extension}` file under `upload_dir`.
pub async fn store(upload_dir: &Path, extension: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(format!("{}.{}", uuid::Uuid::new_v4(), extension));
    tokio::fs::write(&path, bytes).await?;
    debug!("Stored {} bytes of audio at {}", bytes.len(), path.display());
    Ok(path)
}

/// Deletes a stored audio file. A file that is already gone is only logged.
pub async fn remove(path: &Path) -> Result<(), Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed audio file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Audio file {} was already missing", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
