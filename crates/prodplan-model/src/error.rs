use prodplan_solver::SolutionStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("At least one product is required")]
    NoProducts,
    #[error("At least one constraint is required")]
    NoConstraints,
    #[error("Non-finite value in {0}")]
    NonFiniteValue(String),
    #[error("Constraint {} has {found} coefficients but there are {expected} products", .constraint + 1)]
    ShapeMismatch {
        /// Zero-based constraint index
        constraint: usize,
        expected: usize,
        found: usize,
    },
    #[error("No production plan satisfies every constraint")]
    InfeasibleProblem,
    #[error("Profit can grow without limit; the constraints do not bound production")]
    UnboundedProblem,
    #[error("Solver error: {0}")]
    Backend(String),
    #[error("Cannot build a feasible-region scene for a {0} solution")]
    NotOptimal(SolutionStatus),
    #[error("Feasible-region scenes need exactly 2 products, got {0}")]
    NotTwoDimensional(usize),
    #[error("Sample bound must be finite and positive, got {0}")]
    InvalidSampleBound(f64),
}
