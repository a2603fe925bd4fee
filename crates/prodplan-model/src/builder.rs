use prodplan_solver::{ConstraintOp, LpProblem, Sense};
use tracing::debug;

use crate::input::{ConstraintSet, ProductSet};
use crate::Error;

/// Check that every constraint has one coefficient per product.
pub fn check_shape(products: &ProductSet, constraints: &ConstraintSet) -> Result<(), Error> {
    let expected = products.len();
    for (j, c) in constraints.iter().enumerate() {
        if c.coefficients.len() != expected {
            return Err(Error::ShapeMismatch {
                constraint: j,
                expected,
                found: c.coefficients.len(),
            });
        }
    }
    Ok(())
}

/// Build the profit-maximizing LP for a production plan.
///
/// One non-negative variable per product, objective `max sum(profit * units)`,
/// and one `<=` row per constraint.
pub fn build_problem(products: &ProductSet, constraints: &ConstraintSet) -> Result<LpProblem, Error> {
    check_shape(products, constraints)?;

    let mut lp = LpProblem::new(products.names());
    lp.set_objective(products.profits(), Sense::Maximize);

    for (j, c) in constraints.iter().enumerate() {
        lp.add_constraint(c.label(j), c.coefficients.clone(), ConstraintOp::Le, c.limit);
    }

    debug!(
        variables = lp.num_variables(),
        constraints = lp.num_constraints(),
        "built production LP"
    );

    Ok(lp)
}
