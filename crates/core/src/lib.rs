//! Pedigree trees for the DenBlå-Angora rabbit registry.
//!
//! The crate works on an [`AncestorNode`](pedigree::AncestorNode) tree as
//! delivered by the registry backend and offers three independent views
//! over it: pre-order traversal, ancestor frequency ranking and the
//! generation-indexed pedigree grid used to render a pedigree table.

pub mod error;
pub mod pedigree;
pub mod types;

pub use error::{PedigreeError, Result};
