//! Absolute-path arithmetic for the namespace tree.
//!
//! Paths are normalized absolute strings: `"/"` for the root, otherwise
//! `/`-separated segments with no trailing separator. All helpers are pure.

use serde::{Deserialize, Serialize};

/// Root path of every drive
pub const ROOT: &str = "/";

/// Inbox folder for items shared by other drives; always present
pub const SHARED: &str = "/shared";

/// Label shown for the root breadcrumb
pub const ROOT_LABEL: &str = "Root";

/// One breadcrumb: display label plus the ancestor path it navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

/// Join a parent path and a child name into the child's absolute path.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Split an absolute path into its parent path and leaf name.
///
/// Returns `None` for the root, which has no parent.
pub fn split(path: &str) -> Option<(String, &str)> {
    if path == ROOT {
        return None;
    }
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    let parent = if idx == 0 { ROOT.to_string() } else { path[..idx].to_string() };
    Some((parent, name))
}

/// Leaf name of a path; the root has the empty name.
pub fn leaf(path: &str) -> &str {
    split(path).map(|(_, name)| name).unwrap_or("")
}

/// Whether `path` is a strict descendant of `ancestor`.
///
/// Prefix check includes the trailing separator so `/foo2` never matches
/// `/foo`; a path is not a descendant of itself.
pub fn is_strict_descendant(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.len() > ancestor.len() && path.starts_with(ancestor) && path.as_bytes()[ancestor.len()] == b'/'
}

/// Rewrite `path` so the `old_prefix` ancestor becomes `new_prefix`.
///
/// Callers guarantee `path` equals `old_prefix` or descends from it.
pub fn reparent(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    if path == old_prefix {
        new_prefix.to_string()
    } else {
        format!("{}{}", new_prefix, &path[old_prefix.len()..])
    }
}

/// Whether a single entry name is acceptable: non-empty, no separator.
pub fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}

/// Resolve a path into breadcrumbs from the root to the path itself.
///
/// The root crumb carries a distinct label; each segment crumb carries the
/// segment name and the ancestor path it ends at.
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        label: ROOT_LABEL.to_string(),
        path: ROOT.to_string(),
    }];
    if path == ROOT {
        return crumbs;
    }
    let mut ancestor = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        ancestor.push('/');
        ancestor.push_str(segment);
        crumbs.push(Breadcrumb {
            label: segment.to_string(),
            path: ancestor.clone(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_from_root_and_nested() {
        assert_eq!(join("/", "docs"), "/docs");
        assert_eq!(join("/docs", "notes"), "/docs/notes");
    }

    #[test]
    fn test_split_round_trips_join() {
        assert_eq!(split("/docs"), Some(("/".to_string(), "docs")));
        assert_eq!(split("/docs/notes"), Some(("/docs".to_string(), "notes")));
        assert_eq!(split("/"), None);
    }

    #[test]
    fn test_strict_descendant_needs_separator() {
        assert!(is_strict_descendant("/foo", "/foo/bar"));
        assert!(is_strict_descendant("/foo", "/foo/bar/baz"));
        assert!(!is_strict_descendant("/foo", "/foo"));
        assert!(!is_strict_descendant("/foo", "/foo2"));
        assert!(is_strict_descendant("/", "/foo"));
        assert!(!is_strict_descendant("/", "/"));
    }

    #[test]
    fn test_reparent_rewrites_prefix_only() {
        assert_eq!(reparent("/a", "/a", "/b/a"), "/b/a");
        assert_eq!(reparent("/a/x/y", "/a", "/b/a"), "/b/a/x/y");
    }

    #[test]
    fn test_breadcrumbs_root_is_distinct() {
        let crumbs = breadcrumbs("/");
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].label, ROOT_LABEL);
        assert_eq!(crumbs[0].path, "/");
    }

    #[test]
    fn test_breadcrumbs_orders_ancestors() {
        let crumbs = breadcrumbs("/docs/notes/2024");
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(labels, vec![ROOT_LABEL, "docs", "notes", "2024"]);
        assert_eq!(paths, vec!["/", "/docs", "/docs/notes", "/docs/notes/2024"]);
    }

    #[test]
    fn test_valid_name_rejects_separators_and_empty() {
        assert!(valid_name("notes"));
        assert!(valid_name("a.txt"));
        assert!(!valid_name(""));
        assert!(!valid_name("a/b"));
    }
}
