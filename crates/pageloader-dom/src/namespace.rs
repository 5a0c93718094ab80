//! Page namespacing
//!
//! Several pages stay mounted in the same document at once. While a page is
//! hidden every id and class inside its container is prefixed with
//! `page_{id}:` so lookups and stylesheets only ever see the active page.
//!
//! The live `checked` property does not survive a markup round trip, so
//! namespacing records it as a sentinel class that
//! [`Namespacer::apply_state_changes`] turns back into state.

use crate::{DomError, DomTree, NodeId};

/// Class injected on checked controls while their page is namespaced
pub const CHECKED_SENTINEL: &str = "--page_loader:checked=true";

/// Root attribute marking a namespaced subtree
const NAMESPACE_MARKER: &str = "data-page-namespace";

/// Two-way id/class transform over a subtree
pub struct Namespacer;

impl Namespacer {
    /// Prefix used for `page_id`
    pub fn prefix(page_id: &str) -> String {
        format!("page_{page_id}:")
    }

    /// Page the subtree is currently namespaced for, if any
    pub fn namespaced_for(tree: &DomTree, root: NodeId) -> Option<String> {
        tree.element(root)
            .ok()?
            .get_attr(NAMESPACE_MARKER)
            .map(str::to_string)
    }

    /// Prefix every id and class below `root`.
    ///
    /// Fails if the subtree is already namespaced; restore it first.
    pub fn namespace(tree: &mut DomTree, root: NodeId, page_id: &str) -> Result<(), DomError> {
        if let Some(page) = Self::namespaced_for(tree, root) {
            return Err(DomError::AlreadyNamespaced { root, page });
        }
        tree.element_mut(root)?.set_attr(NAMESPACE_MARKER, page_id);

        let prefix = Self::prefix(page_id);
        for node in tree.descendants(root) {
            let Some(elem) = tree.get_mut(node).and_then(|n| n.as_element_mut()) else {
                continue;
            };

            if let Some(id) = elem.id().map(|id| format!("{prefix}{id}")) {
                elem.set_id(&id);
            }

            let mut class = elem.get_attr("class").unwrap_or_default().to_string();
            if elem.checked && !has_token(&class, CHECKED_SENTINEL) {
                class = append_token(&class, CHECKED_SENTINEL);
            }
            if !class.is_empty() {
                elem.set_attr("class", &map_tokens(&class, |token| format!("{prefix}{token}")));
            }
        }

        tracing::trace!("Namespaced subtree {:?} for page {}", root, page_id);
        Ok(())
    }

    /// Strip the page prefix below `root`. Strings without the prefix are
    /// left alone. Returns false if the subtree was not namespaced.
    pub fn restore(tree: &mut DomTree, root: NodeId, page_id: &str) -> Result<bool, DomError> {
        let was_namespaced = tree.element_mut(root)?.remove_attr(NAMESPACE_MARKER).is_some();

        let prefix = Self::prefix(page_id);
        let strip = |s: &str| s.strip_prefix(prefix.as_str()).unwrap_or(s).to_string();
        for node in tree.descendants(root) {
            let Some(elem) = tree.get_mut(node).and_then(|n| n.as_element_mut()) else {
                continue;
            };

            if let Some(id) = elem.id().map(strip) {
                elem.set_id(&id);
            }

            if let Some(class) = elem.get_attr("class").map(|class| map_tokens(class, strip)) {
                elem.set_attr("class", &class);
            }
        }

        Ok(was_namespaced)
    }

    /// Re-check every control carrying the sentinel and drop the sentinel.
    ///
    /// Repeated calls never toggle state: a control is only ever set to
    /// checked, and the sentinel is gone after the first call. Returns how
    /// many controls were re-checked.
    pub fn apply_state_changes(tree: &mut DomTree, root: NodeId) -> usize {
        let mut applied = 0;
        for node in tree.descendants(root) {
            let Some(elem) = tree.get_mut(node).and_then(|n| n.as_element_mut()) else {
                continue;
            };

            let Some(class) = elem.get_attr("class").filter(|c| has_token(c, CHECKED_SENTINEL)) else {
                continue;
            };
            let class = remove_token(class, CHECKED_SENTINEL);
            if class.is_empty() {
                elem.remove_attr("class");
            } else {
                elem.set_attr("class", &class);
            }
            elem.checked = true;
            applied += 1;
        }
        applied
    }
}

/// Rewrite every whitespace-separated token of `raw` in place. Separators
/// and token order are kept exactly, duplicates included.
fn map_tokens(raw: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut start = None;
    for (i, c) in raw.char_indices() {
        if c.is_ascii_whitespace() {
            if let Some(from) = start.take() {
                out.push_str(&f(&raw[from..i]));
            }
            out.push(c);
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(from) = start {
        out.push_str(&f(&raw[from..]));
    }
    out
}

fn has_token(raw: &str, token: &str) -> bool {
    raw.split_ascii_whitespace().any(|t| t == token)
}

fn append_token(raw: &str, token: &str) -> String {
    if raw.is_empty() {
        token.to_string()
    } else {
        format!("{raw} {token}")
    }
}

/// Inverse of [`append_token`]; other occurrences fall back to dropping
/// the token and single-space joining the rest
fn remove_token(raw: &str, token: &str) -> String {
    if raw == token {
        return String::new();
    }
    if let Some(rest) = raw.strip_suffix(token).and_then(|r| r.strip_suffix(' ')) {
        if !has_token(rest, token) {
            return rest.to_string();
        }
    }
    raw.split_ascii_whitespace()
        .filter(|t| *t != token)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn page(doc: &mut Document) -> NodeId {
        let body = doc.body();
        let root = doc.append_element(body, "div", Some("home_content"));
        doc.set_inner_markup(
            root,
            r#"<h1 id="title" class="big bold">Hi</h1><input id="sw" class="toggle" type="checkbox">"#,
        )
        .unwrap();
        root
    }

    #[test]
    fn test_namespace_prefixes_ids_and_classes() {
        let mut doc = Document::new();
        let root = page(&mut doc);
        Namespacer::namespace(doc.tree_mut(), root, "home").unwrap();

        assert!(doc.get_element_by_id("title").is_none());
        let title = doc.get_element_by_id("page_home:title").unwrap();
        assert_eq!(
            doc.tree().element(title).unwrap().get_attr("class"),
            Some("page_home:big page_home:bold")
        );
        // The container keeps its own id
        assert_eq!(doc.get_element_by_id("home_content"), Some(root));
    }

    #[test]
    fn test_double_namespace_rejected() {
        let mut doc = Document::new();
        let root = page(&mut doc);
        Namespacer::namespace(doc.tree_mut(), root, "home").unwrap();

        let err = Namespacer::namespace(doc.tree_mut(), root, "home").unwrap_err();
        assert_eq!(err, DomError::AlreadyNamespaced { root, page: "home".to_string() });
    }

    #[test]
    fn test_checked_survives_markup_roundtrip() {
        let mut doc = Document::new();
        let root = page(&mut doc);
        let sw = doc.get_element_by_id("sw").unwrap();
        doc.tree_mut().element_mut(sw).unwrap().checked = true;

        Namespacer::namespace(doc.tree_mut(), root, "home").unwrap();
        Namespacer::restore(doc.tree_mut(), root, "home").unwrap();

        let markup = doc.inner_markup(root);
        doc.set_inner_markup(root, &markup).unwrap();
        let sw = doc.get_element_by_id("sw").unwrap();
        assert!(!doc.tree().element(sw).unwrap().checked);

        assert_eq!(Namespacer::apply_state_changes(doc.tree_mut(), root), 1);
        let elem = doc.tree().element(sw).unwrap();
        assert!(elem.checked);
        assert_eq!(elem.get_attr("class"), Some("toggle"));
    }

    #[test]
    fn test_apply_state_changes_idempotent() {
        let mut doc = Document::new();
        let root = page(&mut doc);
        let sw = doc.get_element_by_id("sw").unwrap();
        doc.tree_mut().element_mut(sw).unwrap().checked = true;
        Namespacer::namespace(doc.tree_mut(), root, "home").unwrap();
        Namespacer::restore(doc.tree_mut(), root, "home").unwrap();

        Namespacer::apply_state_changes(doc.tree_mut(), root);
        assert_eq!(Namespacer::apply_state_changes(doc.tree_mut(), root), 0);
        assert!(doc.tree().element(sw).unwrap().checked);
    }

    #[test]
    fn test_token_helpers_keep_separators() {
        assert_eq!(map_tokens(" a  b ", |t| format!("p:{t}")), " p:a  p:b ");
        assert_eq!(map_tokens("a a", |t| t.to_uppercase()), "A A");
        assert_eq!(remove_token(&append_token(" a  b ", "s"), "s"), " a  b ");
        assert_eq!(remove_token(&append_token("", "s"), "s"), "");
        assert_eq!(remove_token("s a s", "s"), "a");
    }

    #[test]
    fn test_restore_unprefixed_is_noop() {
        let mut doc = Document::new();
        let root = page(&mut doc);
        let before = doc.inner_markup(root);
        assert!(!Namespacer::restore(doc.tree_mut(), root, "home").unwrap());
        assert_eq!(doc.inner_markup(root), before);
    }
}
