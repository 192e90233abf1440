//! Path selection by keyword and tag.

use crate::document::{Operation, PathEntry};

/// Keyword and tag predicate over path entries.
///
/// A path is kept when the keyword (if any) occurs case-insensitively in the path text or in the
/// summary or description of one of its operations, AND the tag (if any) is listed by one of its
/// operations. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    keyword: Option<String>,
    keyword_lower: Option<String>,
    tag: Option<String>,
}

/// Paths retained by a [`PathFilter`], in document order.
#[derive(Debug)]
pub struct FilteredPaths<'a, 'g> {
    pub entries: Vec<&'a PathEntry<'g>>,
    /// Number of retained path entries (not operations).
    pub match_count: usize,
}

impl PathFilter {
    #[must_use]
    pub fn new(keyword: Option<&str>, tag: Option<&str>) -> Self {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        let tag = tag.filter(|t| !t.is_empty()).map(str::to_string);
        Self {
            keyword_lower: keyword.as_deref().map(str::to_lowercase),
            keyword,
            tag,
        }
    }

    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none() && self.tag.is_none()
    }

    #[must_use]
    pub fn matches(&self, entry: &PathEntry<'_>) -> bool {
        self.keyword_matches(entry) && self.tag_matches(entry)
    }

    fn keyword_matches(&self, entry: &PathEntry<'_>) -> bool {
        let Some(needle) = self.keyword_lower.as_deref() else {
            return true;
        };
        let contains = |text: &str| text.to_lowercase().contains(needle);
        contains(&entry.path)
            || entry.operations.iter().any(|op| {
                op.summary.as_deref().is_some_and(contains)
                    || op.description.as_deref().is_some_and(contains)
            })
    }

    fn tag_matches(&self, entry: &PathEntry<'_>) -> bool {
        let Some(tag) = self.tag.as_deref() else {
            return true;
        };
        entry.operations.iter().any(|op: &Operation<'_>| op.tags.iter().any(|t| t == tag))
    }

    #[must_use]
    pub fn apply<'a, 'g>(&self, paths: &'a [PathEntry<'g>]) -> FilteredPaths<'a, 'g> {
        let entries: Vec<&'a PathEntry<'g>> = paths.iter().filter(|p| self.matches(p)).collect();
        FilteredPaths {
            match_count: entries.len(),
            entries,
        }
    }

    /// Human-readable list of the active filters, e.g. `keyword="user", tag="Auth"`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(k) = &self.keyword {
            parts.push(format!("keyword=\"{k}\""));
        }
        if let Some(t) = &self.tag {
            parts.push(format!("tag=\"{t}\""));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HttpMethod;

    fn op(summary: &str, tags: &[&str]) -> Operation<'static> {
        Operation {
            method: HttpMethod::Get,
            summary: Some(summary.to_string()),
            description: None,
            operation_id: None,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    fn entry(path: &str, operations: Vec<Operation<'static>>) -> PathEntry<'static> {
        PathEntry {
            path: path.to_string(),
            operations,
        }
    }

    fn sample() -> Vec<PathEntry<'static>> {
        vec![
            entry("/users/{id}", vec![op("Get a user", &["Users"])]),
            entry("/orders", vec![op("List orders", &["Orders"])]),
            entry("/login", vec![op("Sign in", &["Auth"])]),
            entry("/sessions", vec![op("Refresh a user session", &["Auth"])]),
        ]
    }

    #[test]
    fn keyword_matches_path_or_summary() {
        let paths = sample();
        let filtered = PathFilter::new(Some("user"), None).apply(&paths);
        let kept: Vec<&str> = filtered.entries.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(kept, vec!["/users/{id}", "/sessions"]);
        assert_eq!(filtered.match_count, 2);
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let paths = sample();
        let filtered = PathFilter::new(Some("ORDERS"), None).apply(&paths);
        assert_eq!(filtered.match_count, 1);
        assert_eq!(filtered.entries[0].path, "/orders");
    }

    #[test]
    fn tag_and_keyword_must_both_match() {
        let paths = sample();
        let filtered = PathFilter::new(Some("user"), Some("Auth")).apply(&paths);
        let kept: Vec<&str> = filtered.entries.iter().map(|p| p.path.as_str()).collect();
        // /users/{id} matches only the keyword, /login only the tag.
        assert_eq!(kept, vec!["/sessions"]);
    }

    #[test]
    fn tag_match_is_exact() {
        let paths = sample();
        assert_eq!(PathFilter::new(None, Some("auth")).apply(&paths).match_count, 0);
        assert_eq!(PathFilter::new(None, Some("Auth")).apply(&paths).match_count, 2);
    }

    #[test]
    fn absent_filters_keep_everything() {
        let paths = sample();
        let filter = PathFilter::new(Some("  "), Some(""));
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&paths).match_count, paths.len());
        assert_eq!(filter.describe(), "none");
    }

    #[test]
    fn describe_lists_active_filters() {
        let filter = PathFilter::new(Some("pets"), Some("Store"));
        assert_eq!(filter.describe(), "keyword=\"pets\", tag=\"Store\"");
    }
}
