use std::fmt;

use prodplan_solver::Solution;

use crate::input::ProductSet;
use crate::optimize::SolutionExt;

pub const DEFAULT_CURRENCY: &str = "Rp";

/// Format `value` with `decimals` places and comma thousands separators.
pub fn format_currency(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + whole.len() / 3 + 1);
    // Rounding can turn a tiny negative into zero, which should not keep its sign
    if value < 0.0 && digits.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        grouped.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// One-line description of a solution's status.
pub fn status_message(solution: &Solution) -> String {
    match solution.clone().into_result() {
        Ok(_) => "Optimal production plan found".to_string(),
        Err(e) => e.to_string(),
    }
}

/// Text rendering of a solved production plan.
///
/// Decision values are only listed for optimal solutions; every other status
/// prints a single message naming the condition.
pub struct Report<'a> {
    products: &'a ProductSet,
    solution: &'a Solution,
    currency: &'a str,
    analysis: bool,
}

impl<'a> Report<'a> {
    pub fn new(products: &'a ProductSet, solution: &'a Solution) -> Self {
        Self {
            products,
            solution,
            currency: DEFAULT_CURRENCY,
            analysis: false,
        }
    }

    pub fn with_currency(mut self, currency: &'a str) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_analysis(mut self, analysis: bool) -> Self {
        self.analysis = analysis;
        self
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.solution.status)?;

        let Some(values) = self.solution.decision_values() else {
            return writeln!(f, "{}", status_message(self.solution));
        };

        for (product, value) in self.products.iter().zip(values) {
            writeln!(f, "{}: {:.2} units", product.name, value)?;
        }
        writeln!(
            f,
            "Maximum total profit: {} {}",
            self.currency,
            format_currency(self.solution.objective_value, 2)
        )?;

        if self.analysis {
            let analysis = &self.solution.analysis;
            writeln!(f)?;
            if !analysis.binding_constraints.is_empty() {
                writeln!(f, "Binding constraints:")?;
                for name in &analysis.binding_constraints {
                    writeln!(f, "  - {}", name)?;
                }
            }
            writeln!(f, "Shadow prices (profit per extra unit of limit):")?;
            for sp in &analysis.shadow_prices {
                writeln!(f, "  {:30} {:10.4}", sp.constraint, sp.value)?;
            }
            let idle: Vec<_> = analysis
                .reduced_costs
                .iter()
                .filter(|rc| !rc.is_basic && rc.reduced_cost > 0.0)
                .collect();
            if !idle.is_empty() {
                writeln!(f, "Products not produced:")?;
                for rc in idle {
                    writeln!(
                        f,
                        "  {:20} profit must rise by {:.2} to enter the plan",
                        rc.variable, rc.reduced_cost
                    )?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Constraint, ConstraintSet, Product};
    use crate::optimize::solve;

    fn products() -> ProductSet {
        ProductSet::new(vec![Product::new("P1", 3.0), Product::new("P2", 5.0)]).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, 2), "0.00");
        assert_eq!(format_currency(36.0, 2), "36.00");
        assert_eq!(format_currency(999.999, 2), "1,000.00");
        assert_eq!(format_currency(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_currency(-1234.5, 2), "-1,234.50");
        assert_eq!(format_currency(-0.001, 2), "0.00");
        assert_eq!(format_currency(123456.0, 0), "123,456");
    }

    #[test]
    fn test_optimal_report() {
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, 0.0], 4.0),
            Constraint::new(vec![0.0, 2.0], 12.0),
            Constraint::new(vec![3.0, 2.0], 18.0),
        ])
        .unwrap();
        let products = products();
        let solution = solve(&products, &constraints).unwrap();

        let text = Report::new(&products, &solution).to_string();

        assert_eq!(
            text,
            "Status: OPTIMAL\nP1: 2.00 units\nP2: 6.00 units\nMaximum total profit: Rp 36.00\n"
        );

        let text = Report::new(&products, &solution)
            .with_currency("$")
            .with_analysis(true)
            .to_string();
        assert!(text.contains("Maximum total profit: $ 36.00"));
        assert!(text.contains("Binding constraints:\n  - Constraint 2\n  - Constraint 3\n"), "{text}");
    }

    #[test]
    fn test_non_optimal_report_skips_values() {
        let products = products();

        let text = Report::new(&products, &Solution::infeasible()).to_string();
        assert_eq!(text, "Status: INFEASIBLE\nNo production plan satisfies every constraint\n");

        let text = Report::new(&products, &Solution::unbounded()).to_string();
        assert!(text.starts_with("Status: UNBOUNDED\n"));
        assert!(!text.contains("units"));

        let text = Report::new(&products, &Solution::error("pivot exploded")).to_string();
        assert_eq!(text, "Status: ERROR\nSolver error: pivot exploded\n");
    }
}
