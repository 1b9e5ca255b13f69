pub mod hungarian;

pub use hungarian::{min_cost_assignment, CostMatrix};
