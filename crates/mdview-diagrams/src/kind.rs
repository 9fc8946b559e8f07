//! Mermaid diagram type detection.

use std::fmt;

/// Diagram type declared on the first line of a Mermaid source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagramKind {
    Flowchart,
    Graph,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Journey,
    Gantt,
    Pie,
    GitGraph,
    Mindmap,
    Timeline,
    Sankey,
    XyChart,
    Block,
    /// Unrecognized declaration: its first token, or `unknown` when the source is blank.
    Other(String),
}

/// Declaration prefixes in match order, lowercase.
const KEYWORDS: &[(&str, DiagramKind)] = &[
    ("flowchart", DiagramKind::Flowchart),
    ("graph", DiagramKind::Graph),
    ("sequencediagram", DiagramKind::Sequence),
    ("classdiagram", DiagramKind::Class),
    ("statediagram", DiagramKind::State),
    ("erdiagram", DiagramKind::EntityRelationship),
    ("journey", DiagramKind::Journey),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("gitgraph", DiagramKind::GitGraph),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("sankey", DiagramKind::Sankey),
    ("xychart", DiagramKind::XyChart),
    ("block", DiagramKind::Block),
];

impl DiagramKind {
    /// Detect the diagram type from the first non-blank line of `source`.
    #[must_use]
    pub fn detect(source: &str) -> Self {
        let Some(first) = source.lines().map(str::trim).find(|line| !line.is_empty()) else {
            return Self::Other("unknown".to_owned());
        };
        let first = first.to_lowercase();

        KEYWORDS
            .iter()
            .find(|(keyword, _)| first.starts_with(keyword))
            .map_or_else(
                || {
                    let token = first.split_whitespace().next().unwrap_or("unknown");
                    Self::Other(token.to_owned())
                },
                |(_, kind)| kind.clone(),
            )
    }

    /// Human-readable label used in image alt text and diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Graph => "graph",
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::State => "state",
            Self::EntityRelationship => "entity-relationship",
            Self::Journey => "journey",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::GitGraph => "git-graph",
            Self::Mindmap => "mindmap",
            Self::Timeline => "timeline",
            Self::Sankey => "sankey",
            Self::XyChart => "xy-chart",
            Self::Block => "block",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_kinds() {
        assert_eq!(DiagramKind::detect("flowchart TD\n  A --> B"), DiagramKind::Flowchart);
        assert_eq!(DiagramKind::detect("graph LR\n  A --> B"), DiagramKind::Graph);
        assert_eq!(DiagramKind::detect("sequenceDiagram\n  A->>B: hi"), DiagramKind::Sequence);
        assert_eq!(DiagramKind::detect("classDiagram"), DiagramKind::Class);
        assert_eq!(DiagramKind::detect("stateDiagram-v2"), DiagramKind::State);
        assert_eq!(DiagramKind::detect("erDiagram"), DiagramKind::EntityRelationship);
        assert_eq!(DiagramKind::detect("gitGraph"), DiagramKind::GitGraph);
        assert_eq!(DiagramKind::detect("pie title Pets"), DiagramKind::Pie);
        assert_eq!(DiagramKind::detect("sankey-beta"), DiagramKind::Sankey);
        assert_eq!(DiagramKind::detect("xychart-beta"), DiagramKind::XyChart);
        assert_eq!(DiagramKind::detect("block-beta"), DiagramKind::Block);
    }

    #[test]
    fn test_detect_skips_leading_blank_lines() {
        assert_eq!(DiagramKind::detect("\n   \n  gantt\n"), DiagramKind::Gantt);
    }

    #[test]
    fn test_unknown_kind_uses_first_token() {
        let kind = DiagramKind::detect("quadrantChart\n  title Reach");
        assert_eq!(kind, DiagramKind::Other("quadrantchart".to_owned()));
        assert_eq!(kind.label(), "quadrantchart");
    }

    #[test]
    fn test_blank_source_is_unknown() {
        assert_eq!(DiagramKind::detect("  \n\n").label(), "unknown");
    }

    #[test]
    fn test_labels() {
        assert_eq!(DiagramKind::EntityRelationship.to_string(), "entity-relationship");
        assert_eq!(DiagramKind::XyChart.label(), "xy-chart");
        assert_eq!(DiagramKind::GitGraph.label(), "git-graph");
    }
}
