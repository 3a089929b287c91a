//! External media fetching
//!
//! The queue processor depends only on the [`MediaFetcher`] trait. The production
//! implementation, [`YtDlpFetcher`], builds yt-dlp argument vectors from the parsed
//! format grammar and hands them to a [`ProcessRunner`], so argument construction and
//! process mechanics stay separate.
//!
//! - [`YtDlpFetcher`]: Uses the external `yt-dlp` binary
//! - [`UnavailableFetcher`]: Fails every item when no binary is available
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::fetcher::{MediaFetcher, YtDlpFetcher};
//! use media_dl::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = YtDlpFetcher::from_config(&Config::default())
//!         .expect("yt-dlp binary not found");
//!
//!     let file = fetcher.fetch("https://example.com/v/1", "best").await?;
//!     println!("saved {}", file.filepath.display());
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod process;
mod traits;

pub(crate) use cli::TEMP_FILE_PREFIX;
pub use cli::{YtDlpFetcher, download_args, title_args};
pub use noop::UnavailableFetcher;
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use traits::{FetchedFile, MediaFetcher};
