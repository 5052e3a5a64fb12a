// Pedigree module
// Ancestor tree model, traversal, frequency analysis, grid layout and sources

pub mod ear_tag;
pub mod frequency;
pub mod grid;
pub mod node;
pub mod registry;
pub mod source;
pub mod traversal;

pub use ear_tag::EarTag;
pub use frequency::{prominent_ancestors, repeated_ancestors, FrequencyEntry};
pub use grid::{build_grid, GridCell, PedigreeGrid, MAX_GRID_COLUMNS};
pub use node::{AncestorNode, Sex};
pub use registry::Registry;
pub use source::{fetch_prominent_ancestors, ActionResult, FetchError, PedigreeSource};
pub use traversal::{ancestors_at_generation, count_nodes, flatten, max_depth};
