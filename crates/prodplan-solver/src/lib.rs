mod backend;
mod problem;
mod simplex;
mod solution;

pub use backend::Backend;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, Sense, ShapeError};
pub use simplex::{SimplexError, Solver};
pub use solution::{Analysis, ReducedCost, ShadowPrice, Solution, SolutionStatus};
