//! ATX heading outline.
//!
//! [`extract_headings`] scans raw markdown line by line for `#`-style headings,
//! strips inline styling from their text, assigns each a slug, and nests them
//! into a tree by level. Fenced code is not excluded: a `# comment` line inside
//! a code block is reported like any other heading.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\*(.+?)\*\*\*|\*\*(.+?)\*\*|\*(.+?)\*|___(.+?)___|__(.+?)__|_(.+?)_").unwrap()
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap());

static SLUG_INVALID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

static SLUG_SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One heading in the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadingItem {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text with inline styling removed.
    pub text: String,
    /// Zero-based source line.
    pub line: usize,
    /// Anchor identifier derived from the text. Not unique across a document.
    pub slug: String,
    /// Headings nested under this one, in document order.
    pub children: Vec<HeadingItem>,
}

/// Flat heading before nesting.
struct ArenaNode {
    level: u8,
    text: String,
    line: usize,
    slug: String,
}

/// Extract the heading tree from raw markdown.
///
/// Each heading becomes a child of the nearest preceding heading with a
/// smaller level, or a root when there is none. Returns an empty vector when
/// the text has no headings.
#[must_use]
pub fn extract_headings(text: &str) -> Vec<HeadingItem> {
    let nodes: Vec<ArenaNode> = text
        .split('\n')
        .enumerate()
        .filter_map(|(line, raw)| parse_heading(line, raw.trim_end()))
        .collect();
    build_tree(nodes)
}

/// Pre-order view of a heading tree, for flat outline displays.
#[must_use]
pub fn flatten_headings(headings: &[HeadingItem]) -> Vec<&HeadingItem> {
    let mut flat = Vec::new();
    let mut stack: Vec<&HeadingItem> = headings.iter().rev().collect();
    while let Some(item) = stack.pop() {
        flat.push(item);
        stack.extend(item.children.iter().rev());
    }
    flat
}

/// Anchor slug for heading text: lowercase, punctuation removed, whitespace runs as `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let cleaned = SLUG_INVALID_RE.replace_all(&lower, "");
    let dashed = SLUG_SPACES_RE.replace_all(&cleaned, "-");
    dashed.trim_matches('-').to_owned()
}

fn parse_heading(line: usize, raw: &str) -> Option<ArenaNode> {
    let caps = ATX_HEADING_RE.captures(raw)?;
    let text = clean_heading_text(caps[2].trim());
    if text.is_empty() {
        return None;
    }
    // The pattern admits at most six markers.
    let level = u8::try_from(caps[1].len()).ok()?;
    Some(ArenaNode {
        level,
        slug: slugify(&text),
        text,
        line,
    })
}

/// Strip emphasis, links, inline code and images, in that order.
fn clean_heading_text(text: &str) -> String {
    let text = EMPHASIS_RE.replace_all(text, |caps: &Captures| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .map_or_else(String::new, |m| m.as_str().to_owned())
    });
    // Image syntax is handled by its own pass below.
    let text = LINK_RE.replace_all(&text, |caps: &Captures| {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if text[..whole.start].ends_with('!') {
            caps[0].to_owned()
        } else {
            caps[1].to_owned()
        }
    });
    let text = CODE_RE.replace_all(&text, "$1");
    let text = IMAGE_RE.replace_all(&text, "$1");
    text.trim().to_owned()
}

/// Nest flat headings using an explicit stack of open ancestors.
///
/// Parents always precede their children in the arena, so the tree is
/// materialized by walking the arena backwards and moving each finished node
/// into its parent.
fn build_tree(nodes: Vec<ArenaNode>) -> Vec<HeadingItem> {
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        while stack
            .last()
            .is_some_and(|&top| nodes[top].level >= node.level)
        {
            stack.pop();
        }
        parents.push(stack.last().copied());
        stack.push(index);
    }

    let mut children: Vec<Vec<HeadingItem>> = (0..nodes.len()).map(|_| Vec::new()).collect();
    let mut roots = Vec::new();

    for (index, node) in nodes.into_iter().enumerate().rev() {
        let mut own_children = std::mem::take(&mut children[index]);
        own_children.reverse();
        let item = HeadingItem {
            level: node.level,
            text: node.text,
            line: node.line,
            slug: node.slug,
            children: own_children,
        };
        match parents[index] {
            Some(parent) => children[parent].push(item),
            None => roots.push(item),
        }
    }

    roots.reverse();
    roots
}
