//! Format specifier grammar
//!
//! A format string is either a plain yt-dlp selector (`bestvideo+bestaudio/best`) or
//! `<selector>--<target>` where `target` requests extraction/transcoding (`bestaudio--mp3`).

/// Separator between the selector and the transcode target
pub const TARGET_SEPARATOR: &str = "--";

/// Selector used when the client leaves the selector part empty
const FALLBACK_SELECTOR: &str = "best";

/// Targets handled by audio extraction rather than video recoding
const AUDIO_TARGETS: &[&str] = &[
    "mp3", "m4a", "aac", "opus", "vorbis", "flac", "wav", "alac", "ogg",
];

/// Parsed format specifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// yt-dlp native selection expression
    pub selector: String,
    /// Requested transcode target, if any
    pub target: Option<String>,
}

impl FormatSpec {
    /// Parse a format string. Never fails: anything without the separator is a selector.
    pub fn parse(format: &str) -> Self {
        let format = format.trim();
        let (selector, target) = match format.split_once(TARGET_SEPARATOR) {
            Some((selector, target)) => {
                let target = target.trim().to_ascii_lowercase();
                (selector.trim(), (!target.is_empty()).then_some(target))
            }
            None => (format, None),
        };

        let selector = if selector.is_empty() {
            FALLBACK_SELECTOR.to_string()
        } else {
            selector.to_string()
        };

        Self { selector, target }
    }

    /// Whether the target is an audio-only container
    pub fn is_audio_target(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| AUDIO_TARGETS.contains(&t))
    }
}

impl std::fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}{}{}", self.selector, TARGET_SEPARATOR, target),
            None => f.write_str(&self.selector),
        }
    }
}
