use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Content type used for any extension missing from the MIME table
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Path pattern that matches every object behind a distribution
pub const INVALIDATE_ALL: &str = "/*";

/// Extension to MIME type table for uploaded objects
const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("eot", "application/vnd.ms-fontobject"),
];

/// Cache-Control policy attached to an uploaded object.
///
/// Pages and metadata documents are entry points and must always reflect the
/// latest deploy. Everything else is assumed to be a fingerprinted asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Browsers and edges must revalidate on every request
    Revalidate,
    /// Cache for one year without revalidation
    Immutable,
}

impl CachePolicy {
    /// Value for the `Cache-Control` header
    pub fn header_value(self) -> &'static str {
        match self {
            CachePolicy::Revalidate => "public, max-age=0, must-revalidate",
            CachePolicy::Immutable => "public, max-age=31536000, immutable",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value())
    }
}

/// One file of the build directory, ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Object key: the path relative to the build root, `/`-separated
    pub key: String,
    pub source: PathBuf,
    pub content_type: &'static str,
    pub cache_policy: CachePolicy,
}

impl FileEntry {
    /// Derive upload metadata for `source`, which must live under `root`
    pub fn new(root: &Path, source: &Path) -> Option<Self> {
        let relative = source.strip_prefix(root).ok()?;
        let key = object_key(relative)?;

        Some(Self {
            key,
            source: source.to_path_buf(),
            content_type: content_type_for(source),
            cache_policy: cache_policy_for(source),
        })
    }
}

/// Request to drop every cached object of a CDN distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub paths: Vec<String>,
    /// Caller reference; fresh random value per request so the API never
    /// treats two deploys as the same invalidation
    pub caller_reference: String,
}

impl InvalidationRequest {
    pub fn new(distribution_id: impl Into<String>) -> Self {
        Self {
            distribution_id: distribution_id.into(),
            paths: vec![INVALIDATE_ALL.to_string()],
            caller_reference: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Pipeline stage, used to tag a failed deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Upload,
    Invalidate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Upload => "upload",
            Stage::Invalidate => "invalidate",
        };
        f.write_str(name)
    }
}

/// File extension as written; matching is case-sensitive
fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Look up the MIME type for a file by its extension
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = extension(path) else {
        return FALLBACK_CONTENT_TYPE;
    };

    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// HTML and JSON documents revalidate; all other files are immutable
pub fn cache_policy_for(path: &Path) -> CachePolicy {
    match extension(path) {
        Some("html") | Some("json") => CachePolicy::Revalidate,
        _ => CachePolicy::Immutable,
    }
}

/// Build an object key from a relative path.
///
/// Only plain components are accepted so a key can never point above the
/// bucket root, and separators are always `/` regardless of platform.
pub fn object_key(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_table() {
        let expected = [
            ("index.html", "text/html"),
            ("style.css", "text/css"),
            ("app.js", "application/javascript"),
            ("manifest.json", "application/json"),
            ("logo.svg", "image/svg+xml"),
            ("logo.png", "image/png"),
            ("photo.jpg", "image/jpeg"),
            ("photo.jpeg", "image/jpeg"),
            ("anim.gif", "image/gif"),
            ("favicon.ico", "image/x-icon"),
            ("font.woff", "font/woff"),
            ("font.woff2", "font/woff2"),
            ("font.ttf", "font/ttf"),
            ("font.eot", "application/vnd.ms-fontobject"),
        ];
        assert_eq!(expected.len(), MIME_TYPES.len());

        for (file, mime) in expected {
            assert_eq!(content_type_for(Path::new(file)), mime, "{}", file);
        }
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type_for(Path::new("data.wasm")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("README")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new(".htaccess")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert_eq!(content_type_for(Path::new("INDEX.HTML")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("Photo.JPG")), FALLBACK_CONTENT_TYPE);
        assert_eq!(cache_policy_for(Path::new("INDEX.HTML")), CachePolicy::Immutable);
        assert_eq!(cache_policy_for(Path::new("feed.JSON")), CachePolicy::Immutable);
    }

    #[test]
    fn test_cache_policy_split() {
        assert_eq!(cache_policy_for(Path::new("index.html")), CachePolicy::Revalidate);
        assert_eq!(cache_policy_for(Path::new("nested/page.html")), CachePolicy::Revalidate);
        assert_eq!(cache_policy_for(Path::new("manifest.json")), CachePolicy::Revalidate);

        assert_eq!(cache_policy_for(Path::new("app.abc123.js")), CachePolicy::Immutable);
        assert_eq!(cache_policy_for(Path::new("style.css")), CachePolicy::Immutable);
        assert_eq!(cache_policy_for(Path::new("font.woff2")), CachePolicy::Immutable);
        assert_eq!(cache_policy_for(Path::new("LICENSE")), CachePolicy::Immutable);
    }

    #[test]
    fn test_cache_policy_header_values() {
        assert_eq!(
            CachePolicy::Revalidate.header_value(),
            "public, max-age=0, must-revalidate"
        );
        assert_eq!(
            CachePolicy::Immutable.header_value(),
            "public, max-age=31536000, immutable"
        );
    }

    #[test]
    fn test_object_key_nested() {
        assert_eq!(
            object_key(Path::new("assets/app.abc123.js")).as_deref(),
            Some("assets/app.abc123.js")
        );
        assert_eq!(object_key(Path::new("index.html")).as_deref(), Some("index.html"));
    }

    #[test]
    fn test_object_key_rejects_non_normal_components() {
        assert!(object_key(Path::new("../secret")).is_none());
        assert!(object_key(Path::new("/etc/passwd")).is_none());
        assert!(object_key(Path::new("")).is_none());
    }

    #[test]
    fn test_file_entry_new() {
        let root = Path::new("/site/dist");
        let entry = FileEntry::new(root, Path::new("/site/dist/assets/app.abc123.js")).unwrap();

        assert_eq!(entry.key, "assets/app.abc123.js");
        assert_eq!(entry.source, PathBuf::from("/site/dist/assets/app.abc123.js"));
        assert_eq!(entry.content_type, "application/javascript");
        assert_eq!(entry.cache_policy, CachePolicy::Immutable);
    }

    #[test]
    fn test_file_entry_outside_root() {
        assert!(FileEntry::new(Path::new("/site/dist"), Path::new("/other/index.html")).is_none());
    }

    #[test]
    fn test_invalidation_request_covers_everything() {
        let request = InvalidationRequest::new("E2EXAMPLE");
        assert_eq!(request.distribution_id, "E2EXAMPLE");
        assert_eq!(request.paths, vec!["/*".to_string()]);
        assert_eq!(request.caller_reference.len(), 32);
        assert!(request.caller_reference.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_invalidation_tokens_are_unique() {
        let first = InvalidationRequest::new("E2EXAMPLE");
        let second = InvalidationRequest::new("E2EXAMPLE");
        assert_ne!(first.caller_reference, second.caller_reference);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Validate.to_string(), "validate");
        assert_eq!(Stage::Upload.to_string(), "upload");
        assert_eq!(Stage::Invalidate.to_string(), "invalidate");
    }
}
