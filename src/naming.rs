//! Deterministic content keys derived from media URLs
//!
//! A [`ContentKey`] names an artifact on disk: a short MD5 fragment of the URL
//! plus a best-effort human-readable base taken from the URL's last path
//! segment. Same URL in, same key out: generation is pure, does no I/O, and
//! never fails.

/// Longest base name kept after sanitization; MD5 fragment disambiguates beyond that
const MAX_BASE_LEN: usize = 64;

/// Fallback base name when the URL yields nothing usable
const FALLBACK_BASE: &str = "video";

/// Deterministic, filesystem-safe identifier for a media URL
///
/// The composed prefix `{base_name}_{hash}` is both the cache key and the
/// on-disk file-name prefix; the extension is appended later by the external
/// tool. Collisions are bounded only by the truncated hash space, an accepted
/// trade-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey {
    base_name: String,
    hash: String,
}

impl ContentKey {
    /// Derive the key for a URL
    ///
    /// Empty or malformed input still yields a well-formed key with the base
    /// name `"video"`.
    pub fn for_url(url: &str) -> Self {
        Self {
            base_name: extract_base_name(url),
            hash: url_hash(url),
        }
    }

    /// The human-readable fragment of the key
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The 8-hex-character URL hash
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The composed file-name prefix, `{base_name}_{hash}`
    pub fn prefix(&self) -> String {
        format!("{}_{}", self.base_name, self.hash)
    }
}

/// First 8 hex characters of the MD5 of the URL's UTF-8 bytes
pub fn url_hash(url: &str) -> String {
    let digest = md5::compute(url.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(8);
    hex
}

/// Best-effort human-readable fragment from the URL's last path segment,
/// minus its extension, sanitized for the filesystem
fn extract_base_name(url: &str) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return FALLBACK_BASE.to_string();
    };

    let Some(last_segment) = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|s| !s.is_empty())
    else {
        return FALLBACK_BASE.to_string();
    };

    // Strip the extension, keeping names like "archive.tar" intact enough
    let stem = std::path::Path::new(&last_segment)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&last_segment);

    let sanitized = sanitize(stem);
    if sanitized.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        sanitized
    }
}

/// Replace filesystem-hostile characters and cap the length
fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    out.truncate(MAX_BASE_LEN);

    // A name of only separators reads as empty
    if out.chars().all(|c| c == '_' || c == '.' || c == '-') {
        String::new()
    } else {
        out
    }
}
