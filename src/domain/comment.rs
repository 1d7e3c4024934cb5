use serde::{Deserialize, Serialize};

use crate::domain::contact::{email_in, names_for};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub post_id: String,
    pub text: Option<String>,
    pub author_name: Option<String>,
    pub author_id: Option<String>,
    pub author_url: Option<String>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub timestamp: Option<String>,
    pub permalink: Option<String>,
}

/// Raw comment fields before derivation.
#[derive(Debug, Clone, Default)]
pub struct CommentParts {
    pub comment_id: String,
    pub post_id: String,
    pub text: Option<String>,
    pub author_name: Option<String>,
    pub author_id: Option<String>,
    pub author_url: Option<String>,
    pub timestamp: Option<String>,
    pub permalink: Option<String>,
}

impl From<CommentParts> for Comment {
    fn from(parts: CommentParts) -> Self {
        let email = email_in(parts.text.as_deref().unwrap_or(""));
        let (first_name, last_name) = names_for(parts.author_name.as_deref());
        Self {
            comment_id: parts.comment_id,
            post_id: parts.post_id,
            text: parts.text,
            author_name: parts.author_name,
            author_id: parts.author_id,
            author_url: parts.author_url,
            email,
            first_name,
            last_name,
            timestamp: parts.timestamp,
            permalink: parts.permalink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_from_parts() {
        let comment = Comment::from(CommentParts {
            comment_id: "c1".into(),
            post_id: "p1".into(),
            text: Some("mail me: maria@souza.com.br".into()),
            author_name: Some("Maria Clara Souza".into()),
            ..Default::default()
        });
        assert_eq!(comment.email, "maria@souza.com.br");
        assert_eq!(comment.first_name.as_deref(), Some("Maria"));
        assert_eq!(comment.last_name.as_deref(), Some("Clara Souza"));
    }

    #[test]
    fn test_missing_text_gives_empty_email() {
        let comment = Comment::from(CommentParts {
            comment_id: "c1".into(),
            ..Default::default()
        });
        assert_eq!(comment.email, "");
        assert!(comment.first_name.is_none());
    }
}
