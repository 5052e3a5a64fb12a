//! Pure traversals over a pedigree tree.
//!
//! A missing root (`None`) is a valid, empty pedigree everywhere in this
//! module. None of these functions mutate the tree.

use crate::types::Generation;

use super::node::AncestorNode;

/// Flatten a pedigree in pre-order: the root, then the whole father
/// subtree, then the whole mother subtree.
///
/// Sparse trees are fine; missing parents contribute nothing.
pub fn flatten(root: Option<&AncestorNode>) -> Vec<&AncestorNode> {
    root.map(|node| node.iter().collect()).unwrap_or_default()
}

/// Number of generations in the tree, counting the root.
///
/// `None` has depth 0 and a node without parents has depth 1.
pub fn max_depth(root: Option<&AncestorNode>) -> usize {
    match root {
        None => 0,
        Some(node) => 1 + max_depth(node.father.as_deref()).max(max_depth(node.mother.as_deref())),
    }
}

/// Number of nodes present in the tree.
pub fn count_nodes(root: Option<&AncestorNode>) -> usize {
    root.map_or(0, |node| node.iter().count())
}

/// The nodes exactly `generation` parent edges above the root, father side
/// first.
pub fn ancestors_at_generation(
    root: Option<&AncestorNode>,
    generation: Generation,
) -> Vec<&AncestorNode> {
    let mut found = Vec::new();
    if let Some(node) = root {
        collect_generation(node, generation, &mut found);
    }
    found
}

fn collect_generation<'a>(node: &'a AncestorNode, remaining: Generation, found: &mut Vec<&'a AncestorNode>) {
    if remaining == 0 {
        found.push(node);
        return;
    }
    if let Some(father) = node.father.as_deref() {
        collect_generation(father, remaining - 1, found);
    }
    if let Some(mother) = node.mother.as_deref() {
        collect_generation(mother, remaining - 1, found);
    }
}
