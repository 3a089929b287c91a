//! Traits and types for media fetching

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::PathBuf;

/// A file produced by one successful fetch
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// Sanitized, human-readable filename including extension
    pub filename: String,
    /// Absolute path to the local file
    pub filepath: PathBuf,
}

/// Trait for retrieving one remote media item to a local file
///
/// The queue processor calls this once per work item. Implementations must allocate
/// their own collision-free output location for every call, since several tasks may
/// be fetching at the same time.
///
/// # Examples
///
/// ```no_run
/// use media_dl::fetcher::{MediaFetcher, YtDlpFetcher};
/// use media_dl::Config;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = YtDlpFetcher::from_config(&Config::default())
///     .expect("yt-dlp not found");
///
/// let file = fetcher
///     .fetch("https://example.com/watch?v=abc", "bestaudio--mp3")
///     .await?;
/// println!("{} -> {}", file.filename, file.filepath.display());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch `url` using the format specifier `format` (`<selector>` or `<selector>--<target>`)
    ///
    /// # Errors
    ///
    /// - [`FetchError::Spawn`] if the external tool cannot be started
    /// - [`FetchError::FetchFailed`] if the tool exits non-zero
    /// - [`FetchError::OutputMissing`] if the tool succeeds but no file can be located
    async fn fetch(&self, url: &str, format: &str) -> Result<FetchedFile, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
