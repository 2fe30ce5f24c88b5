//! Lookups over answer trees
//!
//! Read-only traversals of a [`SurveyItemResponse`]'s item tree. Both lookups
//! are `O(size of tree)` in the worst case and never allocate beyond the
//! split of the dotted key.

use crate::models::{ResponseItem, SurveyItemResponse};

/// Find an item by its full dotted path, starting at the root key.
///
/// The first segment must equal the root item's key and every following
/// segment must match a direct child at that level.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::models::{ResponseItem, SurveyItemResponse};
/// use survey_export_sdk::navigation::get_by_full_path;
///
/// let answer = SurveyItemResponse::new(
///     "s.Q1",
///     ResponseItem::group("rg", vec![ResponseItem::group("scg", vec![ResponseItem::new("2")])]),
/// );
/// assert_eq!(get_by_full_path(&answer, "rg.scg.2").map(|i| i.key.as_str()), Some("2"));
/// assert!(get_by_full_path(&answer, "rg.mcg").is_none());
/// ```
pub fn get_by_full_path<'a>(
    response: &'a SurveyItemResponse,
    dotted_key: &str,
) -> Option<&'a ResponseItem> {
    let root = response.response.as_ref()?;
    item_by_full_path(root, dotted_key)
}

/// [`get_by_full_path`] over a bare item tree
pub fn item_by_full_path<'a>(root: &'a ResponseItem, dotted_key: &str) -> Option<&'a ResponseItem> {
    let mut segments = dotted_key.split('.');
    if segments.next()? != root.key {
        return None;
    }
    segments.try_fold(root, |current, segment| current.child(segment))
}

/// Find an item by its own key anywhere in the tree.
///
/// Checks the root, then its direct children, then descends depth-first into
/// each child's subtree. The first match wins.
pub fn get_by_short_key<'a>(
    response: &'a SurveyItemResponse,
    key: &str,
) -> Option<&'a ResponseItem> {
    let root = response.response.as_ref()?;
    item_by_short_key(root, key)
}

/// [`get_by_short_key`] over a bare item tree
pub fn item_by_short_key<'a>(root: &'a ResponseItem, key: &str) -> Option<&'a ResponseItem> {
    if root.key == key {
        return Some(root);
    }
    if let Some(direct) = root.child(key) {
        return Some(direct);
    }
    root.items
        .iter()
        .find_map(|child| item_by_short_key(child, key))
}
