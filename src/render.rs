use crate::concept::ConceptNode;

/// What a rendered line represents; the UI layer picks styling off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Title,
    Value,
    Media,
    PreviewItem,
}

/// One display line of a flattened concept tree.
///
/// `target` is the keyword a click or Enter on this line navigates to;
/// title and media lines carry the node's own title, everything else is
/// informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub text: String,
    pub role: LineRole,
    pub depth: usize,
    pub target: Option<String>,
}

impl TreeLine {
    pub fn is_navigable(&self) -> bool {
        self.target.is_some()
    }
}

/// Flattens a concept tree into display lines.
///
/// Pure and idempotent: the same node always produces the same lines, in
/// order title, value, media, preview items, then each child subtree in the
/// order the service supplied them. Recursion bottoms out on nodes without
/// children; no depth cap is applied.
pub fn render_tree(node: &ConceptNode) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    render_into(node, 0, &mut lines);
    lines
}

fn render_into(node: &ConceptNode, depth: usize, lines: &mut Vec<TreeLine>) {
    lines.push(TreeLine {
        text: node.title.clone(),
        role: LineRole::Title,
        depth,
        target: Some(node.title.clone()),
    });

    if let Some(value) = &node.value {
        lines.push(TreeLine {
            text: value.clone(),
            role: LineRole::Value,
            depth,
            target: None,
        });
    }

    if let Some(media) = &node.media {
        // The image shares the title's navigation trigger.
        lines.push(TreeLine {
            text: format!("[image] {media}"),
            role: LineRole::Media,
            depth,
            target: Some(node.title.clone()),
        });
    }

    if let Some(preview) = &node.preview {
        for item in preview {
            lines.push(TreeLine {
                text: item.clone(),
                role: LineRole::PreviewItem,
                depth,
                target: None,
            });
        }
    }

    if let Some(children) = &node.children {
        for child in children {
            render_into(child, depth + 1, lines);
        }
    }
}
