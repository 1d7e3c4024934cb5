pub mod kind;
pub mod paths;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Author, Comment, CommentParts, Post};

pub use kind::{QueryKind, QueryMarkers};
use paths::{comment as comment_paths, feed, focused, scalar_text};

/// Records extracted from one response body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Normalized {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    /// Units (lines) dropped because they were not valid JSON.
    pub skipped: usize,
}

impl Normalized {
    fn absorb(&mut self, other: Normalized) {
        self.posts.extend(other.posts);
        self.comments.extend(other.comments);
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    deep_search: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self { deep_search: true }
    }

    /// Normalizer that only follows the listed paths.
    pub fn without_deep_search() -> Self {
        Self { deep_search: false }
    }

    /// Normalize a raw response body.
    ///
    /// A body that parses as one JSON document is a single unit. Anything else
    /// is treated as newline-delimited JSON: each non-blank line is parsed on
    /// its own and lines that fail are logged and skipped.
    ///
    /// `post_hint` is the post id known to the caller; it is used for comments
    /// whose payload carries none.
    pub fn normalize_body(&self, kind: QueryKind, body: &str, post_hint: Option<&str>) -> Normalized {
        if body.trim().is_empty() {
            tracing::debug!(%kind, "empty response body");
            return Normalized::default();
        }

        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return self.normalize_value(kind, &value, post_hint);
        }

        let mut out = Normalized::default();
        for (index, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(value) => out.absorb(self.normalize_value(kind, &value, post_hint)),
                Err(e) => {
                    tracing::warn!(%kind, line = index + 1, error = %e, "skipping unparseable response line");
                    out.skipped += 1;
                }
            }
        }
        out
    }

    /// Normalize one parsed JSON unit.
    pub fn normalize_value(&self, kind: QueryKind, value: &Value, post_hint: Option<&str>) -> Normalized {
        match kind {
            QueryKind::Feed => self.feed_unit(value, post_hint),
            QueryKind::FocusedComments => self.focused_unit(value, post_hint),
        }
    }

    fn feed_unit(&self, value: &Value, post_hint: Option<&str>) -> Normalized {
        let deep = self.deep_search;
        let story = locate_story(value);

        let post_id = feed::POST_ID.text(story, deep).unwrap_or_default();
        if post_id.is_empty() {
            tracing::debug!("feed story without a post id");
        }
        let text = feed::TEXT.text(story, deep).unwrap_or_default();

        let author = match feed::ACTOR.resolve(story, deep) {
            Some(actor) => Author {
                name: feed::ACTOR_NAME.text(actor, deep),
                id: feed::ACTOR_ID.text(actor, deep),
                profile_url: feed::ACTOR_URL.text(actor, deep),
            },
            None => Author {
                name: feed::AUTHOR_NAME_FALLBACK.text(story, deep),
                id: feed::AUTHOR_ID_FALLBACK.text(story, deep),
                profile_url: None,
            },
        };

        let comment_post_id = if post_id.is_empty() {
            post_hint.unwrap_or_default()
        } else {
            post_id.as_str()
        };
        let comments = feed::TOP_LEVEL_COMMENTS
            .resolve(story, deep)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| first_pointer(entry, feed::TOP_LEVEL_COMMENT_NODE))
                    .map(|node| self.comment(node, comment_post_id))
                    .collect()
            })
            .unwrap_or_default();

        Normalized {
            posts: vec![Post::new(post_id, text, author)],
            comments,
            skipped: 0,
        }
    }

    fn focused_unit(&self, value: &Value, post_hint: Option<&str>) -> Normalized {
        let deep = self.deep_search;
        let story_id = focused::POST_ID
            .text(value, deep)
            .filter(|id| !id.is_empty())
            .or_else(|| post_hint.map(str::to_string))
            .unwrap_or_default();

        let comments = match focused::EDGES.resolve(value, deep).and_then(Value::as_array) {
            Some(edges) => edges
                .iter()
                .filter_map(|edge| first_pointer(edge, focused::EDGE_NODE))
                .map(|node| self.comment(node, &story_id))
                .collect(),
            None => {
                tracing::warn!(post_id = %story_id, "comment edges missing or not a list");
                Vec::new()
            }
        };

        Normalized {
            posts: Vec::new(),
            comments,
            skipped: 0,
        }
    }

    /// Comment fields are only read at their listed paths; a deep search
    /// inside a comment node would pick up the author's fields.
    fn comment(&self, node: &Value, post_id: &str) -> Comment {
        let link = comment_paths::timestamp_link(node);
        let timestamp = link
            .and_then(|l| comment_paths::LINK_CREATED.resolve(l, false))
            .or_else(|| comment_paths::CREATED.resolve(node, false))
            .and_then(timestamp_text);
        let permalink = link
            .and_then(|l| comment_paths::LINK_URL.text(l, false))
            .or_else(|| comment_paths::PERMALINK.text(node, false));

        Comment::from(CommentParts {
            comment_id: comment_paths::ID.text(node, false).unwrap_or_default(),
            post_id: post_id.to_string(),
            text: comment_paths::TEXT.text(node, false),
            author_name: comment_paths::AUTHOR_NAME.text(node, false),
            author_id: comment_paths::AUTHOR_ID.text(node, false),
            author_url: comment_paths::AUTHOR_URL.text(node, false),
            timestamp,
            permalink,
        })
    }
}

/// The story node of a feed unit, or the unit itself when none is recognizable.
fn locate_story(value: &Value) -> &Value {
    feed::STORY
        .iter()
        .filter_map(|pointer| value.pointer(pointer))
        .find(|node| node.get("comet_sections").is_some() || node.get("post_id").is_some())
        .unwrap_or(value)
}

fn first_pointer<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .find_map(|pointer| value.pointer(pointer).filter(|v| v.is_object()))
}

/// Unix seconds become RFC 3339 UTC; strings are kept as given.
fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        other => scalar_text(other),
    }
}
