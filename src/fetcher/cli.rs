//! yt-dlp backed fetcher

use super::process::{ProcessRunner, TokioProcessRunner};
use super::traits::{FetchedFile, MediaFetcher};
use crate::config::Config;
use crate::error::FetchError;
use crate::format::FormatSpec;
use crate::utils::build_filename;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of every per-invocation temp file
pub(crate) const TEMP_FILE_PREFIX: &str = "media-dl-";

/// Suffixes yt-dlp uses for incomplete or intermediate files
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Fetcher that shells out to yt-dlp
///
/// Each call allocates a unique temp prefix, runs one download invocation with playlist
/// expansion disabled, locates the produced file by prefix, then makes a best-effort
/// title lookup to derive the display filename.
///
/// # Examples
///
/// ```no_run
/// use media_dl::fetcher::YtDlpFetcher;
/// use media_dl::Config;
/// use std::path::PathBuf;
///
/// // Explicit binary
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"), &Config::default());
///
/// // Or resolve from config / PATH
/// let fetcher = YtDlpFetcher::from_config(&Config::default())
///     .expect("yt-dlp not found in PATH");
/// ```
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    temp_dir: PathBuf,
    cookies_file: Option<PathBuf>,
    extra_args: Vec<String>,
    max_title_length: usize,
}

impl YtDlpFetcher {
    /// Create a fetcher for an explicit binary path
    pub fn new(binary_path: PathBuf, config: &Config) -> Self {
        Self::with_runner(binary_path, config, Arc::new(TokioProcessRunner))
    }

    /// Create a fetcher with a custom process runner
    pub fn with_runner(
        binary_path: PathBuf,
        config: &Config,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            binary_path,
            runner,
            temp_dir: config.queue.temp_dir.clone(),
            cookies_file: config.tools.cookies_file.clone(),
            extra_args: config.tools.extra_args.clone(),
            max_title_length: config.queue.max_title_length,
        }
    }

    /// Resolve the binary from `tools.yt_dlp_path`, or from PATH when allowed
    ///
    /// Returns `None` if no binary can be found.
    pub fn from_config(config: &Config) -> Option<Self> {
        let binary_path = match &config.tools.yt_dlp_path {
            Some(path) => path.clone(),
            None if config.tools.search_path => which::which("yt-dlp").ok()?,
            None => return None,
        };
        Some(Self::new(binary_path, config))
    }

    /// Path of the binary this fetcher invokes
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    async fn lookup_title(&self, url: &str) -> Result<String, FetchError> {
        let output = self.runner.run(&self.binary_path, &title_args(url)).await?;
        if !output.success() {
            return Err(FetchError::TitleLookupFailed(output.diagnostics()));
        }
        output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FetchError::TitleLookupFailed("empty title".into()))
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, format: &str) -> Result<FetchedFile, FetchError> {
        let spec = FormatSpec::parse(format);
        let stem = format!("{}{}", TEMP_FILE_PREFIX, uuid::Uuid::new_v4());
        let prefix = self.temp_dir.join(&stem);
        let template = format!("{}.%(ext)s", prefix.display());

        let args = download_args(
            &spec,
            &template,
            url,
            self.cookies_file.as_deref(),
            &self.extra_args,
        );

        let output = self.runner.run(&self.binary_path, &args).await?;
        if !output.success() {
            remove_outputs(&self.temp_dir, &stem).await;
            return Err(FetchError::FetchFailed {
                exit_code: output.exit_code,
                diagnostics: output.diagnostics(),
            });
        }

        let filepath = locate_output(&self.temp_dir, &stem, spec.target.as_deref())
            .await
            .ok_or_else(|| FetchError::OutputMissing {
                prefix: prefix.clone(),
            })?;

        let title = match self.lookup_title(url).await {
            Ok(title) => Some(title),
            Err(e) => {
                tracing::debug!(url, error = %e, "Title lookup failed, using generic filename");
                None
            }
        };

        let extension = filepath.extension().and_then(|e| e.to_str());
        let filename = build_filename(title.as_deref(), extension, self.max_title_length);

        Ok(FetchedFile { filename, filepath })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Build the argument vector for one download invocation
pub fn download_args(
    spec: &FormatSpec,
    output_template: &str,
    url: &str,
    cookies_file: Option<&Path>,
    extra_args: &[String],
) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        spec.selector.clone(),
        "--no-playlist".to_string(),
        "--no-progress".to_string(),
        "-o".to_string(),
        output_template.to_string(),
    ];

    if let Some(target) = &spec.target {
        if spec.is_audio_target() {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                target.clone(),
            ]);
        } else {
            args.extend(["--recode-video".to_string(), target.clone()]);
        }
    }

    if let Some(cookies) = cookies_file {
        args.extend(["--cookies".to_string(), cookies.display().to_string()]);
    }

    args.extend(extra_args.iter().cloned());
    args.extend(["--".to_string(), url.to_string()]);
    args
}

/// Build the argument vector for the title lookup
pub fn title_args(url: &str) -> Vec<String> {
    vec![
        "--print".to_string(),
        "title".to_string(),
        "--skip-download".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--".to_string(),
        url.to_string(),
    ]
}

async fn matching_outputs(dir: &Path, stem: &str) -> Vec<PathBuf> {
    let file_prefix = format!("{}.", stem);
    let mut matches = Vec::new();

    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return matches;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(&file_prefix) {
            matches.push(entry.path());
        }
    }
    matches.sort();
    matches
}

fn is_partial(path: &Path) -> bool {
    let name = path.to_string_lossy();
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Find the finished file yt-dlp wrote for `stem`, preferring the requested target extension
async fn locate_output(dir: &Path, stem: &str, target: Option<&str>) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = matching_outputs(dir, stem)
        .await
        .into_iter()
        .filter(|p| !is_partial(p))
        .collect();

    if let Some(target) = target
        && let Some(exact) = candidates.iter().find(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(target))
        })
    {
        return Some(exact.clone());
    }
    candidates.into_iter().next()
}

/// Best-effort removal of leftovers after a failed invocation
async fn remove_outputs(dir: &Path, stem: &str) {
    for path in matching_outputs(dir, stem).await {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove leftover temp file");
        }
    }
}
