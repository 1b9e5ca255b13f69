//! Hungarian (Kuhn-Munkres) algorithm for minimum-cost perfect matching.
//!
//! Pure function over a square [`CostMatrix`]: every row is assigned a distinct
//! column so that the summed cost is minimal. Runs in O(n³) using row/column
//! potentials and shortest augmenting paths.

/// Dense, square, row-major matrix of finite costs.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// An `size` × `size` matrix with every cell set to `fill`.
    pub fn filled(size: usize, fill: f64) -> Self {
        assert!(fill.is_finite(), "cost matrix cells must be finite");
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }

    /// Build from rows; each row must have as many cells as there are rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let size = rows.len();
        let mut matrix = Self::filled(size, 0.0);
        for (row, values) in rows.iter().enumerate() {
            assert_eq!(values.len(), size, "cost matrix must be square");
            for (col, &cost) in values.iter().enumerate() {
                matrix.set(row, col, cost);
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, cost: f64) {
        assert!(
            cost.is_finite(),
            "cost matrix cell ({row}, {col}) must be finite, got {cost}"
        );
        self.cells[row * self.size + col] = cost;
    }

    /// Total cost of `assignment` (row → column).
    pub fn total(&self, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| self.at(row, col))
            .sum()
    }
}

const UNMATCHED: usize = usize::MAX;

/// Minimum-cost perfect matching. `result[row]` is the column assigned to `row`.
pub fn min_cost_assignment(costs: &CostMatrix) -> Vec<usize> {
    let n = costs.size();
    if n == 0 {
        return Vec::new();
    }

    // Column `n` is a virtual root from which every augmenting search starts.
    let root = n;
    let mut row_potential = vec![0.0_f64; n];
    let mut col_potential = vec![0.0_f64; n + 1];
    let mut row_of_col = vec![UNMATCHED; n + 1];
    let mut previous_col = vec![root; n + 1];

    for row in 0..n {
        row_of_col[root] = row;
        let mut current_col = root;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut visited = vec![false; n + 1];

        loop {
            visited[current_col] = true;
            let current_row = row_of_col[current_col];
            let mut delta = f64::INFINITY;
            let mut next_col = root;

            for col in 0..n {
                if visited[col] {
                    continue;
                }
                let reduced =
                    costs.at(current_row, col) - row_potential[current_row] - col_potential[col];
                if reduced < min_slack[col] {
                    min_slack[col] = reduced;
                    previous_col[col] = current_col;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    next_col = col;
                }
            }
            debug_assert!(next_col != root, "augmenting search found no column");

            for col in 0..=n {
                if visited[col] {
                    row_potential[row_of_col[col]] += delta;
                    col_potential[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            current_col = next_col;
            if row_of_col[current_col] == UNMATCHED {
                break;
            }
        }

        // Flip the augmenting path back to the root.
        while current_col != root {
            let prior = previous_col[current_col];
            row_of_col[current_col] = row_of_col[prior];
            current_col = prior;
        }
    }

    let mut assignment = vec![UNMATCHED; n];
    for col in 0..n {
        assignment[row_of_col[col]] = col;
    }
    assignment
}
