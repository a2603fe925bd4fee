use prodplan_solver::{Backend, Solution, SolutionStatus, Solver};
use tracing::{info, warn};

use crate::builder::build_problem;
use crate::input::{ConstraintSet, ProductSet};
use crate::Error;

/// Solve a production plan with the default simplex backend.
pub fn solve(products: &ProductSet, constraints: &ConstraintSet) -> Result<Solution, Error> {
    solve_with(&Solver::default(), products, constraints)
}

/// Solve a production plan with `backend`.
///
/// Shape errors are returned before the backend is called. Infeasible,
/// unbounded and failed solves come back as `Ok` with the matching
/// [`SolutionStatus`]; use [`SolutionExt::into_result`] to turn those into errors.
pub fn solve_with<B: Backend + ?Sized>(
    backend: &B,
    products: &ProductSet,
    constraints: &ConstraintSet,
) -> Result<Solution, Error> {
    let problem = build_problem(products, constraints)?;
    let solution = backend.solve(&problem);

    match solution.status {
        SolutionStatus::Optimal => {
            info!(backend = backend.name(), objective = solution.objective_value, "found optimal plan");
        }
        SolutionStatus::Error => {
            warn!(
                backend = backend.name(),
                message = solution.message.as_deref().unwrap_or("unknown"),
                "solver failed"
            );
        }
        status => {
            info!(backend = backend.name(), %status, "no optimal plan");
        }
    }

    Ok(solution)
}

pub trait SolutionExt {
    /// The solution if optimal, otherwise the error naming its status.
    fn into_result(self) -> Result<Solution, Error>;
}

impl SolutionExt for Solution {
    fn into_result(self) -> Result<Solution, Error> {
        match self.status {
            SolutionStatus::Optimal => Ok(self),
            SolutionStatus::Infeasible => Err(Error::InfeasibleProblem),
            SolutionStatus::Unbounded => Err(Error::UnboundedProblem),
            SolutionStatus::Error => Err(Error::Backend(
                self.message.unwrap_or_else(|| "unknown failure".to_string()),
            )),
        }
    }
}
