//! Filename helpers for display names and HTTP download headers

/// Name used when nothing usable remains after sanitizing
const FALLBACK_NAME: &str = "download";

/// Make a human-readable name safe to use as a filename
///
/// Replaces filesystem-illegal characters with `_`, trims surrounding whitespace and dots,
/// and caps the result at `max_len` characters.
///
/// # Examples
///
/// ```
/// use media_dl::utils::sanitize_for_display;
///
/// assert_eq!(sanitize_for_display("AC/DC: Live?", 200), "AC_DC_ Live_");
/// assert_eq!(sanitize_for_display("...", 200), "download");
/// ```
pub fn sanitize_for_display(name: &str, max_len: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_illegal(c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let capped: String = trimmed.chars().take(max_len).collect();
    let capped = capped.trim_end_matches(|c: char| c.is_whitespace() || c == '.');

    if capped.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        capped.to_string()
    }
}

/// Characters that are illegal in filenames on at least one mainstream filesystem
fn is_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

/// Strip everything a legacy `filename="..."` header parameter cannot carry
///
/// Drops non-ASCII characters, control characters, quotes and backslashes. If no stem
/// survives, `download` is substituted while keeping the extension.
///
/// # Examples
///
/// ```
/// use media_dl::utils::ascii_safe;
///
/// assert_eq!(ascii_safe("Café \"live\".mp3"), "Caf live.mp3");
/// assert_eq!(ascii_safe("日本語.mp3"), "download.mp3");
/// ```
pub fn ascii_safe(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"' && *c != '\\')
        .collect();
    let stripped = stripped.trim();

    if stripped.is_empty() {
        FALLBACK_NAME.to_string()
    } else if stripped.starts_with('.') {
        format!("{}{}", FALLBACK_NAME, stripped)
    } else {
        stripped.to_string()
    }
}

/// Build a `Content-Disposition` value carrying both an ASCII fallback and the UTF-8 name
pub fn content_disposition(name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_safe(name),
        urlencoding::encode(name)
    )
}

/// Derive the final filename from an optional title and the produced file's extension
///
/// Without a title the generic name keeps the correct extension.
pub fn build_filename(title: Option<&str>, extension: Option<&str>, max_len: usize) -> String {
    let stem = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => sanitize_for_display(title, max_len),
        None => FALLBACK_NAME.to_string(),
    };

    match extension.filter(|e| !e.is_empty()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}
