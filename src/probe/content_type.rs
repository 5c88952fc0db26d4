//! Content-type classification for probed downloads

/// Types some servers report for valid archives that don't fit `application/*`
const ALLOWED_LITERALS: &[&str] = &[".gz", "application/octet-stream", "binary/octet-stream"];

/// `application/*` subtypes that indicate a page or API response, not an archive
const DENIED_APPLICATION_SUBTYPES: &[&str] = &["xml", "xhtml+xml", "json", "javascript"];

const APPLICATION_PREFIX: &str = "application/";

/// Check whether a reported content type looks like a downloadable archive.
///
/// A trailing `; charset=...` qualifier is ignored.
pub fn is_archive_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type.map(strip_charset) else {
        return false;
    };
    if content_type.is_empty() {
        return false;
    }

    if ALLOWED_LITERALS.contains(&content_type) {
        return true;
    }

    match content_type.strip_prefix(APPLICATION_PREFIX) {
        Some(subtype) => !DENIED_APPLICATION_SUBTYPES.contains(&subtype),
        None => false,
    }
}

fn strip_charset(content_type: &str) -> &str {
    let trimmed = content_type.trim();
    match trimmed.split_once(';') {
        Some((media_type, params))
            if params
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("charset=") =>
        {
            media_type.trim_end()
        }
        _ => trimmed,
    }
}
