use std::fmt;

use serde::{Deserialize, Serialize};

/// Which GraphQL query produced a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Group feed page: one story per edge, with embedded top-level comments.
    Feed,
    /// Focused story view: a story id and a list of comment edges.
    FocusedComments,
}

impl QueryKind {
    /// Tag a response by the query name found in its request body.
    ///
    /// Focused markers are checked first; feed markers are short and could
    /// appear inside longer query names.
    pub fn detect(request_body: &str, markers: &QueryMarkers) -> Option<Self> {
        if mentions_any(request_body, &markers.focused_comments) {
            Some(Self::FocusedComments)
        } else if mentions_any(request_body, &markers.feed) {
            Some(Self::Feed)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::FocusedComments => "focused_comments",
        }
    }
}

fn mentions_any(body: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|m| !m.is_empty() && body.contains(m.as_str()))
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-name markers searched for in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryMarkers {
    pub feed: Vec<String>,
    pub focused_comments: Vec<String>,
}

impl Default for QueryMarkers {
    fn default() -> Self {
        Self {
            feed: vec![
                "GroupsCometFeedRegularStoriesPaginationQuery".to_string(),
                "FeedQuery".to_string(),
            ],
            focused_comments: vec!["CometFocusedStoryViewUFIQuery".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_feed() {
        let markers = QueryMarkers::default();
        let body = "fb_api_req_friendly_name=GroupsCometFeedRegularStoriesPaginationQuery&variables=%7B%7D";
        assert_eq!(QueryKind::detect(body, &markers), Some(QueryKind::Feed));
        assert_eq!(
            QueryKind::detect("name=CometGroupDiscussionRootSuccessFeedQuery", &markers),
            Some(QueryKind::Feed)
        );
    }

    #[test]
    fn test_detect_focused() {
        let markers = QueryMarkers::default();
        let body = "fb_api_req_friendly_name=CometFocusedStoryViewUFIQuery";
        assert_eq!(
            QueryKind::detect(body, &markers),
            Some(QueryKind::FocusedComments)
        );
    }

    #[test]
    fn test_detect_unknown() {
        let markers = QueryMarkers::default();
        assert_eq!(QueryKind::detect("CometNotificationsQuery", &markers), None);
        assert_eq!(QueryKind::detect("", &markers), None);
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let markers = QueryMarkers {
            feed: vec![String::new()],
            focused_comments: vec![],
        };
        assert_eq!(QueryKind::detect("anything", &markers), None);
    }
}
