//! Pedigree grid layout.
//!
//! The grid has one column per generation (column 0 is the subject) and
//! `2^(n_columns - 1)` rows. A cell at column `c` covers
//! `2^(n_columns - c - 1)` rows: the father takes the upper half of his
//! child's rows and the mother the lower half. A missing ancestor becomes
//! a single [`GridCell::Empty`] covering the same rows a known one would,
//! so every column is tiled exactly once.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{PedigreeError, Result};
use crate::types::RowSpan;

use super::node::AncestorNode;

/// Largest supported column count (subject plus 15 generations).
pub const MAX_GRID_COLUMNS: usize = 16;

/// A cell that starts at some `(row, column)` of a [`PedigreeGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GridCell<'a> {
    Ancestor {
        #[serde(serialize_with = "serialize_summary")]
        node: &'a AncestorNode,
        #[serde(rename = "rowSpan")]
        row_span: RowSpan,
    },
    Empty {
        #[serde(rename = "rowSpan")]
        row_span: RowSpan,
    },
}

impl<'a> GridCell<'a> {
    /// Number of rows this cell covers.
    pub fn row_span(&self) -> RowSpan {
        match self {
            GridCell::Ancestor { row_span, .. } | GridCell::Empty { row_span } => *row_span,
        }
    }

    /// The ancestor shown in this cell, if any.
    pub fn node(&self) -> Option<&'a AncestorNode> {
        match self {
            GridCell::Ancestor { node, .. } => Some(*node),
            GridCell::Empty { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty { .. })
    }
}

fn serialize_summary<S: Serializer>(
    node: &&AncestorNode,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    node.summary().serialize(serializer)
}

/// A rows x columns table of pedigree positions with row-span merging.
///
/// `slot(row, col)` is `Some` where a cell starts and `None` where the
/// position is covered by a cell starting higher up in the same column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeGrid<'a> {
    n_rows: usize,
    n_columns: usize,
    #[serde(rename = "rows")]
    slots: Vec<Vec<Option<GridCell<'a>>>>,
}

/// Lay out the pedigree of `root` in `n_columns` generation columns.
///
/// Ancestors more than `n_columns - 1` generations above the root are not
/// placed.
///
/// # Errors
/// Returns [`PedigreeError::InvalidColumns`] if `n_columns` is 0 or larger
/// than [`MAX_GRID_COLUMNS`].
pub fn build_grid(root: Option<&AncestorNode>, n_columns: usize) -> Result<PedigreeGrid<'_>> {
    if n_columns == 0 || n_columns > MAX_GRID_COLUMNS {
        return Err(PedigreeError::InvalidColumns {
            got: n_columns,
            max: MAX_GRID_COLUMNS,
        });
    }

    let n_rows = 1usize << (n_columns - 1);
    let mut grid = PedigreeGrid {
        n_rows,
        n_columns,
        slots: vec![vec![None; n_columns]; n_rows],
    };
    grid.place(root, 0, 0, n_rows);

    log::debug!(
        "Built {}x{} pedigree grid for '{}'",
        n_rows,
        n_columns,
        root.map_or("<none>", |r| r.id.as_str())
    );
    Ok(grid)
}

impl<'a> PedigreeGrid<'a> {
    /// Grid covering `generations` generations above the subject.
    pub fn for_generations(root: Option<&'a AncestorNode>, generations: usize) -> Result<Self> {
        build_grid(root, generations.saturating_add(1))
    }

    fn place(&mut self, node: Option<&'a AncestorNode>, row: usize, column: usize, row_span: RowSpan) {
        if column >= self.n_columns {
            return;
        }

        self.slots[row][column] = Some(match node {
            Some(node) => GridCell::Ancestor { node, row_span },
            None => GridCell::Empty { row_span },
        });

        let half = row_span / 2;
        let (father, mother) = node.map_or((None, None), |n| n.parents());
        self.place(father, row, column + 1, half);
        self.place(mother, row + half, column + 1, half);
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// The cell starting at `(row, column)`, if one starts there.
    pub fn cell(&self, row: usize, column: usize) -> Option<&GridCell<'a>> {
        self.slots.get(row)?.get(column)?.as_ref()
    }

    /// Cells starting in `row`, with their column index.
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = (usize, &GridCell<'a>)> + '_ {
        self.slots
            .get(row)
            .into_iter()
            .flat_map(|slots| slots.iter().enumerate())
            .filter_map(|(column, slot)| slot.as_ref().map(|cell| (column, cell)))
    }

    /// Cells in `column`, top to bottom, with their starting row.
    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = (usize, &GridCell<'a>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(row, slots)| slots.get(column)?.as_ref().map(|cell| (row, cell)))
    }

    /// Row span every cell in `column` must have.
    pub fn expected_span(&self, column: usize) -> RowSpan {
        self.n_rows >> column
    }

    /// Verify that every column is tiled by cells of the expected span with
    /// no gaps or overlaps.
    ///
    /// # Errors
    /// Returns [`PedigreeError::Data`] describing the first violation.
    pub fn check_tiling(&self) -> Result<()> {
        for column in 0..self.n_columns {
            let expected = self.expected_span(column);
            let mut next_free = 0usize;

            for row in 0..self.n_rows {
                match &self.slots[row][column] {
                    Some(cell) => {
                        if row < next_free {
                            return Err(PedigreeError::Data(format!(
                                "Cell at row {}, column {} overlaps the cell above",
                                row, column
                            )));
                        }
                        if row > next_free {
                            return Err(PedigreeError::Data(format!(
                                "Rows {}..{} of column {} are not covered",
                                next_free, row, column
                            )));
                        }
                        if cell.row_span() != expected {
                            return Err(PedigreeError::Data(format!(
                                "Cell at row {}, column {} spans {} rows, expected {}",
                                row,
                                column,
                                cell.row_span(),
                                expected
                            )));
                        }
                        next_free = row + cell.row_span();
                    }
                    None if row >= next_free => {
                        return Err(PedigreeError::Data(format!(
                            "Row {} of column {} is not covered",
                            row, column
                        )));
                    }
                    None => {}
                }
            }

            if next_free != self.n_rows {
                return Err(PedigreeError::Data(format!(
                    "Column {} covers {} rows, expected {}",
                    column, next_free, self.n_rows
                )));
            }
        }
        Ok(())
    }
}

fn cell_label(cell: &GridCell<'_>) -> String {
    match cell.node() {
        Some(node) => match &node.nickname {
            Some(nickname) => format!("{} ({})", node.id, nickname),
            None => node.id.clone(),
        },
        None => "-".to_string(),
    }
}

impl fmt::Display for PedigreeGrid<'_> {
    /// Plain-text table: one line per row, a label where a cell starts and
    /// blanks where a cell from above continues.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .slots
            .iter()
            .flatten()
            .flatten()
            .map(|cell| cell_label(cell).chars().count())
            .max()
            .unwrap_or(1);

        for slots in &self.slots {
            let line: Vec<String> = slots
                .iter()
                .map(|slot| {
                    let label = slot.as_ref().map(cell_label).unwrap_or_default();
                    format!("{:<width$}", label, width = width)
                })
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }
        Ok(())
    }
}
