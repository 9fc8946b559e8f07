//! Bold-wrapped link normalization.
//!
//! Many display renderers do not style `**[label](target)**` as a bold link;
//! moving the emphasis inside the link text (`[**label**](target)`) renders the
//! same intent everywhere.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\[([^\]]+)\]\(([^)]+)\)\*\*").unwrap());

/// Rewrite every `**[label](target)**` into `[**label**](target)`.
#[must_use]
pub fn fix_bold_links(text: &str) -> String {
    BOLD_LINK_RE
        .replace_all(text, "[**${1}**](${2})")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_bold_link() {
        assert_eq!(
            fix_bold_links("See **[the guide](guide.md)** first."),
            "See [**the guide**](guide.md) first."
        );
    }

    #[test]
    fn test_fix_multiple_bold_links() {
        let text = "**[A](a.md)** and **[B](https://b.example/x?y=1)**";
        assert_eq!(
            fix_bold_links(text),
            "[**A**](a.md) and [**B**](https://b.example/x?y=1)"
        );
    }

    #[test]
    fn test_plain_link_unchanged() {
        let text = "[plain](a.md) and **bold** text";
        assert_eq!(fix_bold_links(text), text);
    }

    #[test]
    fn test_already_fixed_link_unchanged() {
        let text = "[**label**](target)";
        assert_eq!(fix_bold_links(text), text);
    }

    #[test]
    fn test_bold_around_non_link_unchanged() {
        let text = "**[not a link]**";
        assert_eq!(fix_bold_links(text), text);
    }
}
