use serde::{Deserialize, Serialize};
use crate::models::domain::{Color, Complexity};

/// Classified purpose of a query
///
/// Each variant carries only the fields its filter strategy reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentKind {
    StyleSearch {
        style: Vec<String>,
    },
    ResponseSearch {
        #[serde(rename = "targetMoves")]
        target_moves: Vec<String>,
        modifiers: Vec<String>,
    },
    ColorSpecific {
        color: Color,
        style: Vec<String>,
    },
    ComplexitySearch {
        complexity: Complexity,
        style: Vec<String>,
    },
    ModifiedOpening {
        #[serde(rename = "openingName")]
        opening_name: String,
        style: Vec<String>,
    },
    SemanticMatch {
        style: Vec<String>,
    },
    Unknown,
}

impl IntentKind {
    /// Wire name of the variant, as used in `searchType`
    pub fn type_name(&self) -> &'static str {
        match self {
            IntentKind::StyleSearch { .. } => "style_search",
            IntentKind::ResponseSearch { .. } => "response_search",
            IntentKind::ColorSpecific { .. } => "color_specific",
            IntentKind::ComplexitySearch { .. } => "complexity_search",
            IntentKind::ModifiedOpening { .. } => "modified_opening",
            IntentKind::SemanticMatch { .. } => "semantic_match",
            IntentKind::Unknown => "unknown",
        }
    }
}

/// Result of intent parsing for one search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    #[serde(flatten)]
    pub kind: IntentKind,
    #[serde(rename = "originalQuery")]
    pub original_query: String,
}

impl QueryIntent {
    pub fn new(kind: IntentKind, original_query: impl Into<String>) -> Self {
        Self {
            kind,
            original_query: original_query.into(),
        }
    }

    /// An unknown intent carries nothing but the query it came from
    pub fn unknown(original_query: impl Into<String>) -> Self {
        Self::new(IntentKind::Unknown, original_query)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, IntentKind::Unknown)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Canonical style keys the caller asked for
    ///
    /// Response modifiers count as requested styles.
    pub fn requested_styles(&self) -> &[String] {
        match &self.kind {
            IntentKind::StyleSearch { style }
            | IntentKind::ColorSpecific { style, .. }
            | IntentKind::ComplexitySearch { style, .. }
            | IntentKind::ModifiedOpening { style, .. }
            | IntentKind::SemanticMatch { style } => style,
            IntentKind::ResponseSearch { modifiers, .. } => modifiers,
            IntentKind::Unknown => &[],
        }
    }

    pub fn target_moves(&self) -> &[String] {
        match &self.kind {
            IntentKind::ResponseSearch { target_moves, .. } => target_moves,
            _ => &[],
        }
    }

    pub fn complexity(&self) -> Option<Complexity> {
        match &self.kind {
            IntentKind::ComplexitySearch { complexity, .. } => Some(*complexity),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match &self.kind {
            IntentKind::ColorSpecific { color, .. } => Some(*color),
            _ => None,
        }
    }

    pub fn opening_name(&self) -> Option<&str> {
        match &self.kind {
            IntentKind::ModifiedOpening { opening_name, .. } => Some(opening_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serializes_with_type_tag() {
        let intent = QueryIntent::new(
            IntentKind::StyleSearch {
                style: vec!["aggressive".to_string()],
            },
            "aggressive openings",
        );
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "style_search");
        assert_eq!(json["style"][0], "aggressive");
        assert_eq!(json["originalQuery"], "aggressive openings");
    }

    #[test]
    fn test_unknown_intent_has_no_fields() {
        let intent = QueryIntent::unknown("xyzzy");
        assert!(intent.is_unknown());
        assert!(intent.requested_styles().is_empty());
        assert!(intent.target_moves().is_empty());
        assert_eq!(intent.complexity(), None);
        assert_eq!(intent.color(), None);
        assert_eq!(intent.opening_name(), None);
    }

    #[test]
    fn test_response_modifiers_are_requested_styles() {
        let intent = QueryIntent::new(
            IntentKind::ResponseSearch {
                target_moves: vec!["d4".to_string()],
                modifiers: vec!["solid".to_string()],
            },
            "solid response to d4",
        );
        assert_eq!(intent.requested_styles(), ["solid".to_string()]);
        assert_eq!(intent.target_moves(), ["d4".to_string()]);
    }

    #[test]
    fn test_complexity_echo_is_lowercase() {
        let intent = QueryIntent::new(
            IntentKind::ComplexitySearch {
                complexity: Complexity::Beginner,
                style: vec![],
            },
            "beginner french defense",
        );
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["complexity"], "beginner");
    }
}
