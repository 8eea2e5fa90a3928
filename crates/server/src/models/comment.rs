//! Comment domain types and request schemas.

use serde::{Deserialize, Serialize};

use teahouse_core::{CommentId, TeaId};

/// A comment attached to exactly one tea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub tea_id: TeaId,
}

/// Payload for creating a comment.
///
/// Any `id` or `tea_id` in the body is ignored; the tea comes from the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreate {
    pub content: String,
}

/// Payload for updating a comment. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CommentPatch {
    /// Overwrite the fields of `comment` that this patch carries.
    pub fn apply(self, comment: &mut Comment) {
        if let Some(content) = self.content {
            comment.content = content;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn comment() -> Comment {
        Comment {
            id: CommentId::new(3),
            content: "Lovely and grassy".to_string(),
            tea_id: TeaId::new(1),
        }
    }

    #[test]
    fn test_create_ignores_client_ids() {
        let payload: CommentCreate =
            serde_json::from_str(r#"{"id": 77, "tea_id": 5, "content": "Smoky"}"#).unwrap();
        assert_eq!(payload.content, "Smoky");
    }

    #[test]
    fn test_empty_patch_keeps_content() {
        let mut c = comment();
        let patch: CommentPatch = serde_json::from_str("{}").unwrap();
        patch.apply(&mut c);
        assert_eq!(c, comment());
    }

    #[test]
    fn test_patch_replaces_content_only() {
        let mut c = comment();
        CommentPatch {
            content: Some("Too bitter".to_string()),
        }
        .apply(&mut c);

        assert_eq!(c.content, "Too bitter");
        assert_eq!(c.id, CommentId::new(3));
        assert_eq!(c.tea_id, TeaId::new(1));
    }
}
