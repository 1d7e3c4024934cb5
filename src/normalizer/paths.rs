//! Declarative extraction paths for the two response shapes.
//!
//! Each field lists JSON pointers in priority order. When none of them hits,
//! the resolver may fall back to [`deep_find`], which scans the whole value
//! for a property with the given name. The payload layout has moved between
//! versions, so the fallback keeps extraction working across those moves, but
//! it matches by name alone: an unrelated property that shares the name
//! anywhere earlier in the tree wins. That imprecision is accepted.

use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct FieldPath {
    pub pointers: &'static [&'static str],
    /// Property name for the deep search, plus a pointer applied to its value.
    pub fallback: Option<(&'static str, &'static str)>,
}

impl FieldPath {
    const fn at(pointers: &'static [&'static str]) -> Self {
        Self {
            pointers,
            fallback: None,
        }
    }

    const fn or_search(self, key: &'static str) -> Self {
        Self {
            fallback: Some((key, "")),
            ..self
        }
    }

    const fn or_search_then(self, key: &'static str, suffix: &'static str) -> Self {
        Self {
            fallback: Some((key, suffix)),
            ..self
        }
    }

    /// First non-null value along the listed pointers, then the deep search.
    pub fn resolve<'a>(&self, root: &'a Value, deep_search: bool) -> Option<&'a Value> {
        let direct = self
            .pointers
            .iter()
            .find_map(|pointer| root.pointer(pointer).filter(|v| !v.is_null()));
        if direct.is_some() || !deep_search {
            return direct;
        }

        let (key, suffix) = self.fallback?;
        let found = deep_find(root, key)?;
        tracing::debug!(key, "field resolved by deep search");
        if suffix.is_empty() {
            Some(found)
        } else {
            found.pointer(suffix).filter(|v| !v.is_null())
        }
    }

    pub fn text(&self, root: &Value, deep_search: bool) -> Option<String> {
        self.resolve(root, deep_search).and_then(scalar_text)
    }
}

/// Depth-first search for a non-null property named `key`.
///
/// An object's own properties are checked before its children. Input is
/// tree-shaped JSON, so there is no cycle tracking.
pub fn deep_find<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key).filter(|v| !v.is_null()) {
                return Some(found);
            }
            map.values().find_map(|child| deep_find(child, key))
        }
        Value::Array(items) => items.iter().find_map(|child| deep_find(child, key)),
        _ => None,
    }
}

/// Scalars as strings; objects, arrays and null have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub mod feed {
    use super::FieldPath;

    /// Candidate story nodes, for paginated pages and streamed lines.
    pub const STORY: &[&str] = &["/data/node/group_feed/edges/0/node", "/data/node", "/data"];

    pub const POST_ID: FieldPath =
        FieldPath::at(&["/comet_sections/feedback/story/post_id", "/post_id"]).or_search("post_id");

    pub const TEXT: FieldPath = FieldPath::at(&[
        "/comet_sections/content/story/comet_sections/message_container/story/message/text",
        "/comet_sections/content/story/message/text",
        "/message/text",
    ])
    .or_search("postText");

    pub const ACTOR: FieldPath = FieldPath::at(&[
        "/comet_sections/content/story/comet_sections/context_layout/story/comet_sections/actor_photo/story/actors/0",
        "/comet_sections/content/story/comet_sections/actor_photo/story/actors/0",
        "/comet_sections/context_layout/story/comet_sections/actor_photo/story/actors/0",
        "/comet_sections/story/comet_sections/actor_photo/story/actors/0",
        "/actors/0",
    ]);

    pub const ACTOR_NAME: FieldPath = FieldPath::at(&["/name"]);
    pub const ACTOR_ID: FieldPath = FieldPath::at(&["/id"]);
    pub const ACTOR_URL: FieldPath = FieldPath::at(&["/url", "/profile_url"]);

    /// Author fields searched over the whole story when no actor node exists.
    pub const AUTHOR_NAME_FALLBACK: FieldPath = FieldPath::at(&[]).or_search("postAuthor");
    pub const AUTHOR_ID_FALLBACK: FieldPath = FieldPath::at(&[]).or_search("postAuthorId");

    pub const TOP_LEVEL_COMMENTS: FieldPath = FieldPath::at(&[
        "/comet_sections/feedback/story/feedback_context/interesting_top_level_comments",
        "/feedback_context/interesting_top_level_comments",
    ])
    .or_search("interesting_top_level_comments");

    /// The comment node inside one top-level comment entry.
    pub const TOP_LEVEL_COMMENT_NODE: &[&str] = &["/comment", ""];
}

pub mod focused {
    use super::FieldPath;

    pub const POST_ID: FieldPath =
        FieldPath::at(&["/data/story_card/post_id", "/data/feedback/story/post_id"]).or_search("post_id");

    pub const EDGES: FieldPath = FieldPath::at(&[
        "/data/feedback/ufi_renderer/feedback/comment_list_renderer/feedback/comment_rendering_instance_for_feed_location/comments/edges",
        "/data/node/comment_rendering_instance_for_feed_location/comments/edges",
    ])
    .or_search_then("comments", "/edges");

    pub const EDGE_NODE: &[&str] = &["/node", ""];
}

pub mod comment {
    use serde_json::Value;

    use super::FieldPath;

    pub const ID: FieldPath = FieldPath::at(&["/id", "/legacy_fbid"]);
    pub const TEXT: FieldPath = FieldPath::at(&["/body/text", "/preferred_body/text"]);
    pub const AUTHOR_NAME: FieldPath = FieldPath::at(&["/author/name"]);
    pub const AUTHOR_ID: FieldPath = FieldPath::at(&["/author/id"]);
    pub const AUTHOR_URL: FieldPath = FieldPath::at(&["/author/url", "/author/profile_url"]);
    pub const CREATED: FieldPath = FieldPath::at(&["/created_time", "/timestamp"]);
    pub const PERMALINK: FieldPath = FieldPath::at(&["/url", "/permalink"]);

    /// Timestamp and permalink inside the timestamp action link.
    pub const LINK_CREATED: FieldPath = FieldPath::at(&["/comment/created_time"]);
    pub const LINK_URL: FieldPath = FieldPath::at(&["/comment/url"]);

    const TIMESTAMP_LINK_TYPE: &str = "XFBCommentTimeStampActionLink";

    /// The entry of `comment_action_links` that carries the comment's time and url.
    pub fn timestamp_link(node: &Value) -> Option<&Value> {
        node.get("comment_action_links")?
            .as_array()?
            .iter()
            .find(|link| link.get("__typename").and_then(Value::as_str) == Some(TIMESTAMP_LINK_TYPE))
    }
}
