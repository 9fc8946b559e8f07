//! Relative image path resolution.
//!
//! Documents loaded from disk or from the web reference images relative to
//! their own location. The display renderer has no notion of that location, so
//! every relative `![alt](path)` is rewritten against an [`ImageBase`].

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\(([^)]+)\)").unwrap());

/// Characters escaped in the path part of a `file://` URI.
const FILE_URI_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Location that relative image references are resolved against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageBase {
    /// Leave relative references untouched.
    #[default]
    None,
    /// Local directory; references become `file://` URIs.
    Path(PathBuf),
    /// Remote directory URL, stored without a trailing `/`.
    Url(String),
}

impl ImageBase {
    /// Base directory on the local filesystem. An empty path yields [`ImageBase::None`].
    #[must_use]
    pub fn path(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            Self::None
        } else {
            Self::Path(dir)
        }
    }

    /// Base URL. Trailing slashes are dropped; an empty URL yields [`ImageBase::None`].
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        let url = url.into();
        let trimmed = url.trim_end_matches('/');
        if trimmed.is_empty() {
            Self::None
        } else {
            Self::Url(trimmed.to_owned())
        }
    }

    /// Resolve one image reference, or `None` when it should stay as written.
    fn resolve(&self, reference: &str) -> Option<String> {
        if let Some(inner) = reference.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            return self.resolve(inner).map(|resolved| format!("<{resolved}>"));
        }
        if is_absolute_reference(reference) {
            return None;
        }
        match self {
            Self::None => None,
            Self::Url(base) => {
                let cleaned = reference.trim_start_matches(['.', '/']);
                Some(format!("{base}/{cleaned}"))
            }
            Self::Path(dir) => Some(file_uri(&absolute_normalized(&dir.join(reference)))),
        }
    }
}

/// Rewrite every relative `![alt](path)` against `base`.
///
/// Web URLs, URIs with any other scheme, and rooted local paths are never
/// touched, so running this twice gives the same result as running it once.
#[must_use]
pub fn resolve_image_paths(text: &str, base: &ImageBase) -> String {
    if *base == ImageBase::None {
        return text.to_owned();
    }
    IMAGE_RE
        .replace_all(text, |caps: &Captures| match base.resolve(&caps[2]) {
            Some(resolved) => format!("![{}]({resolved})", &caps[1]),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

fn is_absolute_reference(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("file:")
        || lower.starts_with("data:")
        || Path::new(reference).has_root()
}

/// Make `path` absolute and fold `.` and `..` components without touching the filesystem.
fn absolute_normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn file_uri(path: &Path) -> String {
    let mut path = path.to_string_lossy().replace('\\', "/");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    format!("file://{}", utf8_percent_encode(&path, FILE_URI_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_base_resolves_relative() {
        let base = ImageBase::url("https://example.com/docs/");
        assert_eq!(
            resolve_image_paths("![diagram](img/flow.png)", &base),
            "![diagram](https://example.com/docs/img/flow.png)"
        );
    }

    #[test]
    fn test_url_base_strips_leading_dots_and_slashes() {
        let base = ImageBase::url("https://example.com/docs");
        assert_eq!(
            resolve_image_paths("![a](./img/a.png) ![b](../b.png)", &base),
            "![a](https://example.com/docs/img/a.png) ![b](https://example.com/docs/b.png)"
        );
    }

    #[test]
    fn test_http_images_untouched_in_every_mode() {
        let text = "![remote](http://cdn.example.com/a.png) ![secure](HTTPS://cdn.example.com/b.png)";
        for base in [
            ImageBase::None,
            ImageBase::url("https://example.com"),
            ImageBase::path("/docs"),
        ] {
            assert_eq!(resolve_image_paths(text, &base), text);
        }
    }

    #[test]
    fn test_no_base_leaves_text_unchanged() {
        let text = "![a](img/a.png)";
        assert_eq!(resolve_image_paths(text, &ImageBase::None), text);
    }

    #[test]
    fn test_empty_bases_are_none() {
        assert_eq!(ImageBase::url(""), ImageBase::None);
        assert_eq!(ImageBase::url("/"), ImageBase::None);
        assert_eq!(ImageBase::path(""), ImageBase::None);
    }

    #[test]
    fn test_empty_alt_text() {
        let base = ImageBase::url("https://example.com");
        assert_eq!(
            resolve_image_paths("![](a.png)", &base),
            "![](https://example.com/a.png)"
        );
    }

    #[test]
    fn test_alt_text_with_brackets() {
        let base = ImageBase::url("https://example.com");
        assert_eq!(
            resolve_image_paths("![a [b]](x.png)", &base),
            "![a [b]](https://example.com/x.png)"
        );
    }

    #[test]
    fn test_angle_bracket_destination() {
        let base = ImageBase::url("https://example.com/docs");
        assert_eq!(
            resolve_image_paths("![x](<img/my chart.png>)", &base),
            "![x](<https://example.com/docs/img/my chart.png>)"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rooted_angle_bracket_destination_untouched() {
        let base = ImageBase::path("/docs");
        let text = "![graph diagram](</tmp/My Docs/diagram-0.png>)";
        assert_eq!(resolve_image_paths(text, &base), text);
    }

    #[cfg(unix)]
    #[test]
    fn test_path_base_emits_file_uri() {
        let base = ImageBase::path("/docs");
        assert_eq!(
            resolve_image_paths("![x](img/a.png)", &base),
            "![x](file:///docs/img/a.png)"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_path_base_normalizes_dot_segments() {
        let base = ImageBase::path("/docs/guide");
        assert_eq!(
            resolve_image_paths("![x](./../img/./a.png)", &base),
            "![x](file:///docs/img/a.png)"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_path_base_percent_encodes() {
        let base = ImageBase::path("/my docs");
        assert_eq!(
            resolve_image_paths("![x](café #1.png)", &base),
            "![x](file:///my%20docs/caf%C3%A9%20%231.png)"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rooted_path_untouched() {
        let base = ImageBase::path("/docs");
        let text = "![x](/var/images/a.png)";
        assert_eq!(resolve_image_paths(text, &base), text);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolution_is_idempotent() {
        let base = ImageBase::path("/docs");
        let once = resolve_image_paths("![x](img/a.png)", &base);
        assert_eq!(resolve_image_paths(&once, &base), once);
    }
}
