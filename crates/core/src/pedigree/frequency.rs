use indexmap::IndexMap;
use serde::Serialize;

use super::node::AncestorNode;

/// How often one ancestor appears among the non-root positions of a
/// pedigree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEntry {
    /// Ancestor id (ear tag).
    pub id: String,
    /// Nickname from the last position seen in pre-order.
    pub nickname: Option<String>,
    /// Number of pedigree positions this ancestor occupies.
    pub occurrences: usize,
}

impl FrequencyEntry {
    /// Whether the ancestor occupies more than one position, i.e. the
    /// pedigree carries some inbreeding through it.
    pub fn is_repeated(&self) -> bool {
        self.occurrences > 1
    }
}

/// Rank the ancestors of `root` by how many pedigree positions they occupy.
///
/// The root itself is never counted from its own position; its id still
/// counts wherever it recurs deeper in the tree. Entries are sorted by
/// descending count. Equal counts keep first-seen pre-order order.
///
/// # Examples
/// ```
/// use denbla_pedigree_core::pedigree::{prominent_ancestors, AncestorNode};
///
/// let root = AncestorNode::new("0001-0001")
///     .with_father(AncestorNode::new("0002-0002").with_father(AncestorNode::new("0009-0009")))
///     .with_mother(AncestorNode::new("0003-0003").with_father(AncestorNode::new("0009-0009")));
/// let ranked = prominent_ancestors(&root);
/// assert_eq!(ranked[0].id, "0009-0009");
/// assert_eq!(ranked[0].occurrences, 2);
/// ```
pub fn prominent_ancestors(root: &AncestorNode) -> Vec<FrequencyEntry> {
    let mut counts: IndexMap<&str, FrequencyEntry> = IndexMap::new();

    for node in root.iter().skip(1) {
        let entry = counts.entry(node.id.as_str()).or_insert_with(|| FrequencyEntry {
            id: node.id.clone(),
            nickname: None,
            occurrences: 0,
        });
        entry.occurrences += 1;
        entry.nickname = node.nickname.clone();
    }

    let mut ranked: Vec<FrequencyEntry> = counts.into_values().collect();
    // Stable, so ties stay in first-seen order.
    ranked.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));

    log::debug!(
        "Ranked {} distinct ancestors of '{}'",
        ranked.len(),
        root.id
    );
    ranked
}

/// Only the ancestors that occupy more than one position, ranked as in
/// [`prominent_ancestors`].
pub fn repeated_ancestors(root: &AncestorNode) -> Vec<FrequencyEntry> {
    prominent_ancestors(root)
        .into_iter()
        .filter(FrequencyEntry::is_repeated)
        .collect()
}
