use thiserror::Error;
use tracing::debug;

use crate::backend::Backend;
use crate::problem::{ConstraintOp, LpProblem, Sense};
use crate::solution::{Analysis, ReducedCost, ShadowPrice, Solution};

/// Consecutive non-improving pivots tolerated before switching to Bland's rule
const DEGENERATE_STREAK_LIMIT: usize = 50;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimplexError {
    #[error("{0}")]
    Shape(#[from] crate::problem::ShapeError),
    #[error("non-finite value in {0}")]
    NonFinite(String),
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
    #[error("iteration limit of {limit} reached in phase {phase}")]
    IterationLimit { limit: usize, phase: u8 },
    #[error("numerical breakdown in phase {phase}: {detail}")]
    Numerical { phase: u8, detail: String },
}

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Backend for Solver {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn solve(&self, problem: &LpProblem) -> Solution {
        Solver::solve(self, problem)
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        match self.run(problem) {
            Ok(Outcome::Optimal(tableau)) => self.extract_solution(&tableau, problem),
            Ok(Outcome::Infeasible) => Solution::infeasible(),
            Ok(Outcome::Unbounded) => Solution::unbounded(),
            Err(e) => {
                debug!(error = %e, "simplex failed");
                Solution::error(e.to_string())
            }
        }
    }

    fn run(&self, problem: &LpProblem) -> Result<Outcome, SimplexError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SimplexError::InvalidTolerance(self.tolerance));
        }
        problem.check_shape()?;
        check_finite(problem)?;

        let mut tableau = self.build_tableau(problem);

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            if !self.phase1(&mut tableau)? {
                debug!("phase 1 left artificial variables positive");
                return Ok(Outcome::Infeasible);
            }
            debug!("phase 1 found a basic feasible solution");
        }

        // Phase 2: Optimize
        let exclude_from = tableau.n_vars + tableau.n_slack;
        match self.iterate(&mut tableau, exclude_from, 2)? {
            PhaseResult::Optimal => Ok(Outcome::Optimal(tableau)),
            PhaseResult::Unbounded => Ok(Outcome::Unbounded),
        }
    }

    fn build_tableau(&self, problem: &LpProblem) -> Tableau {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        // Rows with a negative RHS are negated so every RHS is non-negative
        let rows: Vec<(bool, ConstraintOp)> = problem
            .constraints
            .iter()
            .map(|c| {
                let flip = c.rhs < 0.0;
                (flip, if flip { c.op.flipped() } else { c.op })
            })
            .collect();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for (_, op) in &rows {
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            unit_cols: vec![0; n_constraints],
            flipped: vec![false; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (c, &(flip, op))) in problem.constraints.iter().zip(&rows).enumerate() {
            let sign = if flip { -1.0 } else { 1.0 };
            for (j, &coef) in c.coefficients.iter().enumerate() {
                tableau.data[i][j] = sign * coef;
            }
            tableau.data[i][total_cols - 1] = sign * c.rhs;
            tableau.flipped[i] = flip;

            match op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    tableau.unit_cols[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    tableau.unit_cols[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    tableau.unit_cols[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row). The tableau always maximizes, so a
        // minimization stores the negated coefficients.
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            tableau.data[obj_row][j] = match problem.objective.sense {
                Sense::Maximize => coef,
                Sense::Minimize => -coef,
            };
        }

        tableau
    }

    /// Returns `Ok(false)` when the problem is infeasible.
    fn phase1(&self, tableau: &mut Tableau) -> Result<bool, SimplexError> {
        let n_constraints = tableau.n_constraints();
        let n_cols = tableau.n_cols();
        let art_start = tableau.art_start();

        let orig_obj = std::mem::replace(&mut tableau.data[n_constraints], vec![0.0; n_cols]);

        // Maximize -sum(artificials), priced out against the starting basis
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, art_start, 1)? {
            PhaseResult::Optimal => {}
            PhaseResult::Unbounded => {
                return Err(SimplexError::Numerical {
                    phase: 1,
                    detail: "auxiliary objective reported unbounded".to_string(),
                });
            }
        }

        let rhs_col = n_cols - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col] > self.tolerance {
                return Ok(false);
            }
        }

        // Drive zero-level artificials out of the basis. A row with no usable
        // pivot is redundant and stays put; no later pivot can select it.
        for i in 0..n_constraints {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                self.pivot(tableau, i, col);
            }
        }

        // Restore original objective and price out the basic variables
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_constraints][basic];
            if ratio.abs() > 0.0 {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Ok(true)
    }

    /// Pivot until no column below `exclude_from` can improve the objective.
    fn iterate(&self, tableau: &mut Tableau, exclude_from: usize, phase: u8) -> Result<PhaseResult, SimplexError> {
        let obj_row = tableau.n_constraints();
        let rhs_col = tableau.n_cols() - 1;
        let mut degenerate_streak = 0;

        for iteration in 0..self.max_iterations {
            let bland = degenerate_streak > DEGENERATE_STREAK_LIMIT;
            let Some(pivot_col) = self.find_pivot_column(tableau, exclude_from, bland) else {
                debug!(phase, iterations = iteration, "simplex phase converged");
                return Ok(PhaseResult::Optimal);
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                debug!(phase, iterations = iteration, column = pivot_col, "simplex phase unbounded");
                return Ok(PhaseResult::Unbounded);
            };

            let before = tableau.data[obj_row][rhs_col];
            self.pivot(tableau, pivot_row, pivot_col);
            let after = tableau.data[obj_row][rhs_col];

            if !after.is_finite() {
                return Err(SimplexError::Numerical {
                    phase,
                    detail: format!("objective became {after} after pivot on row {pivot_row}, column {pivot_col}"),
                });
            }
            // The objective row RHS holds -z, so progress shows as a decrease
            if before - after > self.tolerance {
                degenerate_streak = 0;
            } else {
                degenerate_streak += 1;
            }
        }

        Err(SimplexError::IterationLimit {
            limit: self.max_iterations,
            phase,
        })
    }

    fn find_pivot_column(&self, tableau: &Tableau, exclude_from: usize, bland: bool) -> Option<usize> {
        let obj = &tableau.data[tableau.n_constraints()];

        if bland {
            return (0..exclude_from).find(|&j| obj[j] > self.tolerance);
        }

        // Look for the most positive reduced cost (can improve objective)
        let mut max_val = self.tolerance;
        let mut max_col = None;
        for (j, &value) in obj.iter().enumerate().take(exclude_from) {
            if value > max_val {
                max_val = value;
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.n_cols() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.n_constraints() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            let better = match min_row {
                None => true,
                Some(best) => {
                    ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[best])
                }
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_cols = tableau.n_cols();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for value in tableau.data[row].iter_mut() {
            *value /= pivot_val;
        }

        let pivot_row = tableau.data[row].clone();
        for (i, data_row) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = data_row[col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n_cols {
                data_row[j] -= factor * pivot_row[j];
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.n_cols() - 1;

        // Clamp floating noise so values honour the non-negativity bounds
        let mut values = vec![0.0; n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                values[basic] = tableau.data[i][rhs_col].max(0.0);
            }
        }

        let objective_value = problem.evaluate(&values);
        let analysis = self.analyze(tableau, problem, &values);

        Solution::optimal(values, objective_value, analysis)
    }

    fn analyze(&self, tableau: &Tableau, problem: &LpProblem, values: &[f64]) -> Analysis {
        let obj = &tableau.data[tableau.n_constraints()];
        // Duals of the internal maximization, converted back to the caller's sense
        let sense_sign = match problem.objective.sense {
            Sense::Maximize => 1.0,
            Sense::Minimize => -1.0,
        };

        let shadow_prices: Vec<ShadowPrice> = problem
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let flip_sign = if tableau.flipped[i] { -1.0 } else { 1.0 };
                let value = -obj[tableau.unit_cols[i]] * flip_sign * sense_sign;
                ShadowPrice {
                    constraint: c.name.clone(),
                    value: if value.abs() < self.tolerance { 0.0 } else { value },
                }
            })
            .collect();

        let reduced_costs = problem
            .variables
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let is_basic = tableau.basic_vars.contains(&j);
                ReducedCost {
                    variable: name.clone(),
                    value: values[j],
                    reduced_cost: if is_basic { 0.0 } else { -obj[j] },
                    is_basic,
                }
            })
            .collect();

        let binding_constraints = shadow_prices
            .iter()
            .filter(|sp| sp.value != 0.0)
            .map(|sp| sp.constraint.clone())
            .collect();

        Analysis {
            shadow_prices,
            reduced_costs,
            binding_constraints,
        }
    }
}

fn check_finite(problem: &LpProblem) -> Result<(), SimplexError> {
    if problem.objective.coefficients.iter().any(|v| !v.is_finite()) {
        return Err(SimplexError::NonFinite("objective".to_string()));
    }
    for c in &problem.constraints {
        if !c.rhs.is_finite() || c.coefficients.iter().any(|v| !v.is_finite()) {
            return Err(SimplexError::NonFinite(format!("constraint {}", c.name)));
        }
    }
    Ok(())
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    /// Column holding the starting identity entry of each row
    unit_cols: Vec<usize>,
    /// Rows negated to make the RHS non-negative
    flipped: Vec<bool>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn n_constraints(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn art_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}

enum Outcome {
    Optimal(Tableau),
    Infeasible,
    Unbounded,
}

enum PhaseResult {
    Optimal,
    Unbounded,
}
