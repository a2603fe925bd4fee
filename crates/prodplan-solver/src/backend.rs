use crate::problem::LpProblem;
use crate::solution::Solution;

/// A linear programming backend.
///
/// Implementations report infeasibility, unboundedness and internal failures
/// through [`Solution::status`] rather than panicking.
pub trait Backend {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &LpProblem) -> Solution;
}
