/// Distance in parent edges from the pedigree subject (subject = 0).
pub type Generation = usize;

/// Number of grid rows a cell covers.
pub type RowSpan = usize;

/// Coefficient of inbreeding, in `[0, 1]`.
pub type Coefficient = f64;
