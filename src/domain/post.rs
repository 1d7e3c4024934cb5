use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::contact::{email_in, names_for};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub id: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: String,
    pub text: String,
    pub author: Author,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Post {
    /// Build a post and derive its email and name fields.
    pub fn new(post_id: impl Into<String>, text: impl Into<String>, author: Author) -> Self {
        let text = text.into();
        let email = email_in(&text);
        let (first_name, last_name) = names_for(author.name.as_deref());
        Self {
            post_id: post_id.into(),
            text,
            author,
            email,
            first_name,
            last_name,
        }
    }
}

/// Post scraped from the rendered page rather than from an API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostStub {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl PostStub {
    /// Deterministic id for stubs the page rendered without one.
    pub fn synthesize_id(author: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(author.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("stub-{}", &digest[..16])
    }
}

impl From<PostStub> for Post {
    fn from(stub: PostStub) -> Self {
        let text = stub.text.trim().to_string();
        let post_id = match stub.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => PostStub::synthesize_id(stub.author.as_deref().unwrap_or(""), &text),
        };
        let author = Author {
            name: stub.author,
            ..Author::default()
        };
        Post::new(post_id, text, author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_contact_fields() {
        let author = Author {
            name: Some("Jo Silva".into()),
            id: Some("u1".into()),
            profile_url: None,
        };
        let post = Post::new("p1", "hello a@b.com", author);
        assert_eq!(post.email, "a@b.com");
        assert_eq!(post.first_name.as_deref(), Some("Jo"));
        assert_eq!(post.last_name.as_deref(), Some("Silva"));
    }

    #[test]
    fn test_new_without_author_name() {
        let post = Post::new("p1", "", Author::default());
        assert_eq!(post.email, "");
        assert!(post.first_name.is_none());
        assert!(post.last_name.is_none());
    }

    #[test]
    fn test_stub_keeps_given_id() {
        let stub = PostStub {
            id: Some("mall_post_9".into()),
            text: "  selling a bike  ".into(),
            author: Some("Ana Lima".into()),
        };
        let post = Post::from(stub);
        assert_eq!(post.post_id, "mall_post_9");
        assert_eq!(post.text, "selling a bike");
        assert_eq!(post.first_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_stub_id_synthesis_is_deterministic() {
        let a = PostStub::synthesize_id("Ana Lima", "selling a bike");
        let b = PostStub::synthesize_id("Ana Lima", "selling a bike");
        let c = PostStub::synthesize_id("Ana Lima", "selling a car");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("stub-"));
        assert_eq!(a.len(), "stub-".len() + 16);
    }

    #[test]
    fn test_stub_without_id_gets_synthesized_one() {
        let stub = PostStub {
            id: Some("   ".into()),
            text: "hi".into(),
            author: None,
        };
        let post = Post::from(stub);
        assert_eq!(post.post_id, PostStub::synthesize_id("", "hi"));
    }
}
