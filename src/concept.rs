use serde::{Deserialize, Serialize};

/// A single node of a concept tree as returned by the concept service.
///
/// Nodes are plain data: once received they are never mutated, and history
/// entries hold full snapshots of previously displayed trees.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConceptNode {
    pub title: String,
    /// Wire field is `type`; opaque to the client, passed through as-is.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<String>>,
    /// Unused by rendering, but part of the payload contract: must survive
    /// a serialize round-trip unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ConceptNode>>,
}

impl ConceptNode {
    /// Checks that every node in the tree carries a non-empty title.
    ///
    /// The service occasionally emits structurally valid JSON with blank
    /// titles; such a tree cannot be navigated (the title is the re-fetch
    /// keyword), so it is rejected at the fetch boundary.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("node with empty title".to_string());
        }
        if let Some(children) = &self.children {
            for child in children {
                child.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(title: &str) -> ConceptNode {
        ConceptNode {
            title: title.to_string(),
            kind: "entity".to_string(),
            value: None,
            media: None,
            preview: None,
            action: None,
            children: None,
        }
    }

    #[test]
    fn test_deserialize_wire_type_field() {
        let json = r#"{
            "title": "Jazz",
            "type": "category",
            "value": "A music genre",
            "preview": ["Swing", "Bebop"],
            "children": [{"title": "Bebop", "type": "entity"}]
        }"#;
        let node: ConceptNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.title, "Jazz");
        assert_eq!(node.kind, "category");
        assert_eq!(node.value.as_deref(), Some("A music genre"));
        assert_eq!(node.preview.as_ref().unwrap().len(), 2);
        assert_eq!(node.children.as_ref().unwrap()[0].title, "Bebop");
        assert!(node.children.as_ref().unwrap()[0].value.is_none());
    }

    #[test]
    fn test_action_round_trips() {
        let json = r#"{"title": "X", "type": "fact", "action": "expand"}"#;
        let node: ConceptNode = serde_json::from_str(json).unwrap();
        let back = serde_json::to_string(&node).unwrap();
        let again: ConceptNode = serde_json::from_str(&back).unwrap();
        assert_eq!(again.action.as_deref(), Some("expand"));
        assert_eq!(node, again);
    }

    #[test]
    fn test_serialize_emits_type_not_kind() {
        let node = leaf("Gravity");
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"entity\""));
        assert!(!json.contains("\"kind\""));
    }

    #[test]
    fn test_missing_title_is_deserialize_error() {
        let json = r#"{"type": "entity", "value": "no title here"}"#;
        let result: Result<ConceptNode, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_blank_title_at_depth() {
        let mut root = leaf("Root");
        root.children = Some(vec![leaf("Ok"), leaf("  ")]);
        assert!(root.validate().is_err());

        root.children = Some(vec![leaf("Ok"), leaf("Also ok")]);
        assert!(root.validate().is_ok());
    }
}
