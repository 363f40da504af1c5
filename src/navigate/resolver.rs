//! Path resolution
//!
//! Walks a slash-separated path against the node store without mutating it.
//! Resolution stops at the first segment that does not exist, so callers can
//! report exactly which component failed.

use crate::error::StoreError;
use crate::storage::{NodeId, NodeStore};

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every segment resolved. `node` is `None` for the root.
    Found { node: Option<NodeId>, path: String },
    /// A segment did not resolve. `path` ends with the failing segment.
    Missing { path: String },
}

/// Renders path components as an absolute path; the root is `/`.
pub fn render_path(components: &[String]) -> String {
    format!("/{}", components.join("/"))
}

/// Splits an absolute path string into its components.
pub fn path_components(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits `path` into its parent portion and final segment.
///
/// Returns `None` when the path has no final segment (empty, or only slashes).
/// A bare name yields an empty parent, meaning "the base directory"; a name
/// directly under the root yields `/`.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some(("/", &trimmed[1..])),
        Some(idx) => Some((&trimmed[..idx], &trimmed[idx + 1..])),
        None => Some(("", trimmed)),
    }
}

/// Resolves `path` for `owner`.
///
/// Absolute paths start at the root; relative ones start at `base`, whose
/// rendered path is `base_path`.
pub fn resolve(
    store: &dyn NodeStore,
    owner: &str,
    base: Option<NodeId>,
    base_path: &str,
    path: &str,
) -> Result<Resolution, StoreError> {
    let (mut current, mut components) = if path.starts_with('/') {
        (None, Vec::new())
    } else {
        (base, path_components(base_path))
    };

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." => continue,
            ".." => {
                let Some(id) = current else {
                    // Already at the root
                    continue;
                };
                match store.get(id)? {
                    Some(node) => {
                        current = node.parent;
                        components.pop();
                    }
                    None => {
                        return Ok(Resolution::Missing {
                            path: render_path(&components),
                        });
                    }
                }
            }
            name => match store.find_child(owner, current, name)? {
                Some(node) => {
                    current = Some(node.id);
                    components.push(name.to_string());
                }
                None => {
                    components.push(name.to_string());
                    return Ok(Resolution::Missing {
                        path: render_path(&components),
                    });
                }
            },
        }
    }

    Ok(Resolution::Found {
        node: current,
        path: render_path(&components),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, NodeKind};

    fn fixture() -> (MemoryStore, NodeId, NodeId) {
        let store = MemoryStore::new();
        let home = store
            .create("alice", None, "home", NodeKind::Directory, None)
            .unwrap();
        let docs = store
            .create("alice", Some(home), "docs", NodeKind::Directory, None)
            .unwrap();
        store
            .create("alice", Some(docs), "a.txt", NodeKind::File, Some("a"))
            .unwrap();
        (store, home, docs)
    }

    #[test]
    fn test_absolute_path() {
        let (store, _, docs) = fixture();
        let res = resolve(&store, "alice", None, "/", "/home/docs").unwrap();
        assert_eq!(
            res,
            Resolution::Found {
                node: Some(docs),
                path: "/home/docs".into()
            }
        );
    }

    #[test]
    fn test_relative_with_dots_and_slashes() {
        let (store, home, docs) = fixture();
        let res = resolve(&store, "alice", Some(docs), "/home/docs", "..//./docs/").unwrap();
        assert_eq!(
            res,
            Resolution::Found {
                node: Some(docs),
                path: "/home/docs".into()
            }
        );

        let res = resolve(&store, "alice", Some(docs), "/home/docs", "..").unwrap();
        assert_eq!(
            res,
            Resolution::Found {
                node: Some(home),
                path: "/home".into()
            }
        );
    }

    #[test]
    fn test_parent_of_root_stays_at_root() {
        let (store, _, _) = fixture();
        let res = resolve(&store, "alice", None, "/", "../..").unwrap();
        assert_eq!(
            res,
            Resolution::Found {
                node: None,
                path: "/".into()
            }
        );
    }

    #[test]
    fn test_missing_segment_short_circuits() {
        let (store, _, _) = fixture();
        let res = resolve(&store, "alice", None, "/", "home/nope/docs/deeper").unwrap();
        assert_eq!(
            res,
            Resolution::Missing {
                path: "/home/nope".into()
            }
        );
    }

    #[test]
    fn test_other_owner_sees_nothing() {
        let (store, _, _) = fixture();
        let res = resolve(&store, "bob", None, "/", "home").unwrap();
        assert_eq!(
            res,
            Resolution::Missing {
                path: "/home".into()
            }
        );
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("a"), Some(("", "a")));
        assert_eq!(split_parent("/a"), Some(("/", "a")));
        assert_eq!(split_parent("d/e/f/"), Some(("d/e", "f")));
        assert_eq!(split_parent("/"), None);
        assert_eq!(split_parent(""), None);
    }
}
