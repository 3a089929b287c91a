//! Fetcher used when no yt-dlp binary is available

use super::traits::{FetchedFile, MediaFetcher};
use crate::error::FetchError;
use async_trait::async_trait;

/// Fetcher that fails every item with a "binary not found" error
///
/// Lets the service start and answer status queries when yt-dlp is not installed;
/// every item of every task ends up in the `error` state with an explanatory message.
pub struct UnavailableFetcher;

#[async_trait]
impl MediaFetcher for UnavailableFetcher {
    async fn fetch(&self, _url: &str, _format: &str) -> Result<FetchedFile, FetchError> {
        Err(FetchError::Spawn {
            program: "yt-dlp".into(),
            reason: "binary not found. Configure tools.yt_dlp_path or ensure yt-dlp is in PATH."
                .into(),
        })
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
